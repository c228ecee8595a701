use super::choice_repository::insert_choice;
use super::entities::{question, Question};
use crate::domain::PublishedFilter;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, TransactionTrait};
use std::sync::Arc;
use uuid::Uuid;

/// Admin list filters.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    /// Case-insensitive substring of the question text.
    pub search: Option<String>,
    pub published: Option<PublishedFilter>,
}

#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Inserts the question and its choices atomically. Choices keep the
    /// order they are given in.
    pub async fn create(
        &self,
        question_data: &crate::domain::Question,
        choice_texts: &[String],
    ) -> Result<question::Model, DbErr> {
        let txn = self.db.begin().await?;

        let active = question::ActiveModel {
            id: Set(question_data.id),
            question_text: Set(question_data.question_text.clone()),
            pub_date: Set(question_data.pub_date),
            end_date: Set(question_data.end_date),
        };
        let model = active.insert(&txn).await?;

        for (position, text) in choice_texts.iter().enumerate() {
            let choice = crate::domain::Choice::new(model.id, text.clone(), position as i32);
            insert_choice(&txn, &choice).await?;
        }

        txn.commit().await?;
        Ok(model)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<question::Model>, DbErr> {
        Question::find_by_id(id).one(self.db.as_ref()).await
    }

    /// Questions already published at `now`, newest first.
    pub async fn latest_published(&self, now: DateTime<Utc>, limit: u64) -> Result<Vec<question::Model>, DbErr> {
        Question::find()
            .filter(question::Column::PubDate.lte(now))
            .order_by_desc(question::Column::PubDate)
            .limit(limit)
            .all(self.db.as_ref())
            .await
    }

    pub async fn list(&self, filter: &QuestionFilter, now: DateTime<Utc>) -> Result<Vec<question::Model>, DbErr> {
        let mut query = Question::find();

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((question::Entity, question::Column::QuestionText))))
                    .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            );
        }

        if let Some(published) = filter.published {
            let (since, until) = published.range(now);
            query = query
                .filter(question::Column::PubDate.gte(since))
                .filter(question::Column::PubDate.lt(until));
        }

        query
            .order_by_desc(question::Column::PubDate)
            .all(self.db.as_ref())
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        question_text: String,
        pub_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Option<question::Model>, DbErr> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: question::ActiveModel = existing.into();
        active.question_text = Set(question_text);
        active.pub_date = Set(pub_date);
        active.end_date = Set(end_date);
        active.update(self.db.as_ref()).await.map(Some)
    }

    /// Removes the question; choices and votes go with it.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = Question::delete_by_id(id).exec(self.db.as_ref()).await?;
        Ok(result.rows_affected > 0)
    }
}

const LIKE_ESCAPE: char = '\\';

/// Makes `%` and `_` in user input match literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::transaction_log;
    use chrono::{Duration, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 10, 18, 0, 0).unwrap()
    }

    fn create_test_question(text: &str, days: i64) -> question::Model {
        question::Model {
            id: Uuid::new_v4(),
            question_text: text.to_string(),
            pub_date: now() + Duration::days(days),
            end_date: Some(now() + Duration::days(days + 10)),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let question = create_test_question("What's up?", -1);

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[question.clone()]])
            .into_connection());

        let repo = QuestionRepository::new(db);
        let found = repo.find_by_id(question.id).await.unwrap();

        assert_eq!(found, Some(question));
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<question::Model>::new()])
            .into_connection());

        let repo = QuestionRepository::new(db);
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_published_query_shape() {
        let rows = vec![create_test_question("Newest", -1), create_test_question("Older", -3)];

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows.clone()])
            .into_connection());

        let repo = QuestionRepository::new(db.clone());
        let found = repo.latest_published(now(), 5).await.unwrap();
        assert_eq!(found, rows);

        drop(repo);
        let sql = format!("{:?}", transaction_log(db));
        assert!(sql.contains("\\\"pub_date\\\" <= $1"), "{sql}");
        assert!(sql.contains("ORDER BY \\\"questions\\\".\\\"pub_date\\\" DESC"), "{sql}");
        assert!(sql.contains("LIMIT $2"), "{sql}");
    }

    #[tokio::test]
    async fn test_list_with_search_and_date_filter() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<question::Model>::new()])
            .into_connection());

        let repo = QuestionRepository::new(db.clone());
        let filter = QuestionFilter {
            search: Some("  Editor ".to_string()),
            published: Some(PublishedFilter::Today),
        };
        repo.list(&filter, now()).await.unwrap();

        drop(repo);
        let sql = format!("{:?}", transaction_log(db));
        assert!(sql.contains("LOWER("), "{sql}");
        assert!(sql.contains("LIKE"), "{sql}");
        assert!(sql.contains("%editor%"), "{sql}");
        assert!(sql.contains("\\\"pub_date\\\" >= $"), "{sql}");
        assert!(sql.contains("\\\"pub_date\\\" < $"), "{sql}");
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%"), r"50\%");
        assert_eq!(escape_like("snake_case"), r"snake\_case");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[tokio::test]
    async fn test_list_search_matches_wildcards_literally() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<question::Model>::new()])
            .into_connection());

        let repo = QuestionRepository::new(db.clone());
        let filter = QuestionFilter {
            search: Some("50%".to_string()),
            published: None,
        };
        repo.list(&filter, now()).await.unwrap();

        drop(repo);
        let sql = format!("{:?}", transaction_log(db));
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(sql.contains(r"%50\\%%"), "{sql}");
    }

    #[tokio::test]
    async fn test_update_missing_question() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<question::Model>::new()])
            .into_connection());

        let repo = QuestionRepository::new(db);
        let updated = repo
            .update(Uuid::new_v4(), "text".into(), now(), None)
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection());

        let repo = QuestionRepository::new(db);
        assert!(repo.delete(Uuid::new_v4()).await.unwrap());
    }
}
