use super::entities::{vote, Vote};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, FromQueryResult};
use std::sync::Arc;
use uuid::Uuid;

/// Vote count for one choice.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ChoiceVotes {
    pub choice_id: Uuid,
    pub votes: i64,
}

#[derive(Debug, FromQueryResult)]
struct VoteCount {
    votes: i64,
}

#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_user_and_question(
        &self,
        user_id: Uuid,
        question_id: Uuid,
    ) -> Result<Option<vote::Model>, DbErr> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::QuestionId.eq(question_id))
            .one(self.db.as_ref())
            .await
    }

    /// Records `choice_id` as the user's ballot for the question in a single
    /// statement. An existing ballot is repointed, never duplicated; the
    /// unique `(user_id, question_id)` index arbitrates concurrent requests.
    pub async fn upsert(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        choice_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let active = vote::ActiveModel {
            id: Set(Uuid::new_v4()),
            question_id: Set(question_id),
            choice_id: Set(choice_id),
            user_id: Set(Some(user_id)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        Vote::insert(active)
            .on_conflict(
                OnConflict::columns([vote::Column::UserId, vote::Column::QuestionId])
                    .update_columns([vote::Column::ChoiceId, vote::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(())
    }

    pub async fn count_for_choice(&self, choice_id: Uuid) -> Result<i64, DbErr> {
        let count = Vote::find()
            .select_only()
            .column_as(vote::Column::Id.count(), "votes")
            .filter(vote::Column::ChoiceId.eq(choice_id))
            .into_model::<VoteCount>()
            .one(self.db.as_ref())
            .await?;

        Ok(count.map(|c| c.votes).unwrap_or(0))
    }

    /// Grouped counts for every choice of the question that has votes.
    /// Choices without votes are absent.
    pub async fn counts_by_choice(&self, question_id: Uuid) -> Result<Vec<ChoiceVotes>, DbErr> {
        Vote::find()
            .select_only()
            .column(vote::Column::ChoiceId)
            .column_as(vote::Column::Id.count(), "votes")
            .filter(vote::Column::QuestionId.eq(question_id))
            .group_by(vote::Column::ChoiceId)
            .into_model::<ChoiceVotes>()
            .all(self.db.as_ref())
            .await
    }
}
