use super::db_error;
use crate::domain::{Choice, ChoiceTally, Question, QuestionDetail, QuestionResults};
use crate::infrastructure::db::{ChoiceRepository, QuestionRepository, VoteRepository};
use chrono::{DateTime, Utc};
use polls_errors::AppError;
use std::collections::HashMap;
use uuid::Uuid;

pub const INDEX_PAGE_SIZE: u64 = 5;

/// Read side of the public pages.
pub struct BrowsePolls {
    questions: QuestionRepository,
    choices: ChoiceRepository,
    votes: VoteRepository,
}

impl BrowsePolls {
    pub fn new(questions: QuestionRepository, choices: ChoiceRepository, votes: VoteRepository) -> Self {
        Self {
            questions,
            choices,
            votes,
        }
    }

    /// The most recently published questions; future ones stay hidden.
    pub async fn latest(&self, now: DateTime<Utc>) -> Result<Vec<Question>, AppError> {
        let rows = self
            .questions
            .latest_published(now, INDEX_PAGE_SIZE)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Question::from).collect())
    }

    /// The voting form. Questions outside their voting window are refused
    /// with `NotVotable` so the caller can redirect.
    pub async fn detail(
        &self,
        question_id: Uuid,
        viewer: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<QuestionDetail, AppError> {
        let question = self.question(question_id).await?;

        if !question.can_vote(now) {
            return Err(AppError::NotVotable(question.question_text));
        }

        let choices = self
            .choices
            .find_by_question(question.id)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(Choice::from)
            .collect();

        let selected_choice_id = match viewer {
            Some(user_id) => self
                .votes
                .find_by_user_and_question(user_id, question.id)
                .await
                .map_err(db_error)?
                .map(|v| v.choice_id),
            None => None,
        };

        Ok(QuestionDetail {
            question,
            choices,
            selected_choice_id,
        })
    }

    pub async fn results(&self, question_id: Uuid) -> Result<QuestionResults, AppError> {
        let question = self.question(question_id).await?;
        let choices = self.tallies(question.id).await?;
        Ok(QuestionResults { question, choices })
    }

    /// Every choice of the question with its counted votes, in display order.
    pub async fn tallies(&self, question_id: Uuid) -> Result<Vec<ChoiceTally>, AppError> {
        let choices = self.choices.find_by_question(question_id).await.map_err(db_error)?;
        let counts: HashMap<Uuid, i64> = self
            .votes
            .counts_by_choice(question_id)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|c| (c.choice_id, c.votes))
            .collect();

        Ok(choices
            .into_iter()
            .map(|c| ChoiceTally {
                votes: counts.get(&c.id).copied().unwrap_or(0),
                id: c.id,
                choice_text: c.choice_text,
            })
            .collect())
    }

    async fn question(&self, question_id: Uuid) -> Result<Question, AppError> {
        self.questions
            .find_by_id(question_id)
            .await
            .map_err(db_error)?
            .map(Question::from)
            .ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::entities::{choice, question};
    use chrono::{Duration, TimeZone};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 3, 8, 0, 0).unwrap()
    }

    fn service(db: Arc<DatabaseConnection>) -> BrowsePolls {
        BrowsePolls::new(
            QuestionRepository::new(db.clone()),
            ChoiceRepository::new(db.clone()),
            VoteRepository::new(db),
        )
    }

    fn question_row(days: i64) -> question::Model {
        question::Model {
            id: Uuid::new_v4(),
            question_text: "Past question.".into(),
            pub_date: now() + Duration::days(days),
            end_date: Some(now() + Duration::days(10)),
        }
    }

    fn choice_row(question_id: Uuid, text: &str, position: i32) -> choice::Model {
        choice::Model {
            id: Uuid::new_v4(),
            question_id,
            choice_text: text.into(),
            position,
        }
    }

    #[tokio::test]
    async fn detail_of_future_question_is_not_votable() {
        let row = question_row(5);
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[row.clone()]])
            .into_connection());

        let err = service(db).detail(row.id, None, now()).await.unwrap_err();
        assert!(matches!(err, AppError::NotVotable(_)));
    }

    #[tokio::test]
    async fn detail_of_past_question_lists_choices() {
        let row = question_row(-5);
        let choices = vec![choice_row(row.id, "Yes", 0), choice_row(row.id, "No", 1)];
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[row.clone()]])
            .append_query_results([choices.clone()])
            .into_connection());

        let detail = service(db).detail(row.id, None, now()).await.unwrap();
        assert_eq!(detail.question.question_text, "Past question.");
        assert_eq!(detail.choices.len(), 2);
        assert_eq!(detail.choices[0].choice_text, "Yes");
        assert!(detail.selected_choice_id.is_none());
    }

    #[tokio::test]
    async fn detail_of_missing_question() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<question::Model>::new()])
            .into_connection());

        let err = service(db).detail(Uuid::new_v4(), None, now()).await.unwrap_err();
        assert_eq!(err, AppError::NotFound);
    }

    #[tokio::test]
    async fn results_fill_in_zero_counts() {
        let row = question_row(-1);
        let yes = choice_row(row.id, "Yes", 0);
        let no = choice_row(row.id, "No", 1);
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[row.clone()]])
            .append_query_results([vec![yes.clone(), no.clone()]])
            .append_query_results([[BTreeMap::from([
                ("choice_id", Value::from(no.id)),
                ("votes", Value::BigInt(Some(3))),
            ])]])
            .into_connection());

        let results = service(db).results(row.id).await.unwrap();

        assert_eq!(
            results.choices,
            vec![
                ChoiceTally { id: yes.id, choice_text: "Yes".into(), votes: 0 },
                ChoiceTally { id: no.id, choice_text: "No".into(), votes: 3 },
            ]
        );
        assert_eq!(results.total_votes(), 3);
    }
}
