use super::entities::{choice, Choice};
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, FromQueryResult, PaginatorTrait};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, FromQueryResult)]
struct ChoiceCount {
    question_id: Uuid,
    choices: i64,
}

#[derive(Clone)]
pub struct ChoiceRepository {
    db: Arc<DatabaseConnection>,
}

impl ChoiceRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_question(&self, question_id: Uuid) -> Result<Vec<choice::Model>, DbErr> {
        Choice::find()
            .filter(choice::Column::QuestionId.eq(question_id))
            .order_by_asc(choice::Column::Position)
            .all(self.db.as_ref())
            .await
    }

    /// Looks a choice up only within its question; a choice id from another
    /// question resolves to `None`.
    pub async fn find_in_question(
        &self,
        question_id: Uuid,
        choice_id: Uuid,
    ) -> Result<Option<choice::Model>, DbErr> {
        Choice::find_by_id(choice_id)
            .filter(choice::Column::QuestionId.eq(question_id))
            .one(self.db.as_ref())
            .await
    }

    /// Appends a choice after the existing ones.
    pub async fn append(&self, question_id: Uuid, choice_text: String) -> Result<choice::Model, DbErr> {
        let existing = Choice::find()
            .filter(choice::Column::QuestionId.eq(question_id))
            .count(self.db.as_ref())
            .await?;

        let choice_data = crate::domain::Choice::new(question_id, choice_text, existing as i32);
        insert_choice(self.db.as_ref(), &choice_data).await
    }

    pub async fn delete(&self, question_id: Uuid, choice_id: Uuid) -> Result<bool, DbErr> {
        let result = Choice::delete_many()
            .filter(choice::Column::Id.eq(choice_id))
            .filter(choice::Column::QuestionId.eq(question_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count_by_questions(&self, question_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, DbErr> {
        if question_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let counts = Choice::find()
            .select_only()
            .column(choice::Column::QuestionId)
            .column_as(choice::Column::Id.count(), "choices")
            .filter(choice::Column::QuestionId.is_in(question_ids.iter().copied()))
            .group_by(choice::Column::QuestionId)
            .into_model::<ChoiceCount>()
            .all(self.db.as_ref())
            .await?;

        Ok(counts
            .into_iter()
            .map(|c| (c.question_id, c.choices.max(0) as u64))
            .collect())
    }
}

/// Shared with question creation, which inserts choices inside its transaction.
pub(super) async fn insert_choice<C: ConnectionTrait>(
    db: &C,
    choice_data: &crate::domain::Choice,
) -> Result<choice::Model, DbErr> {
    let active = choice::ActiveModel {
        id: Set(choice_data.id),
        question_id: Set(choice_data.question_id),
        choice_text: Set(choice_data.choice_text.clone()),
        position: Set(choice_data.position),
    };
    active.insert(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::transaction_log;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn create_test_choice(question_id: Uuid, text: &str, position: i32) -> choice::Model {
        choice::Model {
            id: Uuid::new_v4(),
            question_id,
            choice_text: text.to_string(),
            position,
        }
    }

    #[tokio::test]
    async fn test_find_in_question_found() {
        let question_id = Uuid::new_v4();
        let choice = create_test_choice(question_id, "Rust", 0);

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[choice.clone()]])
            .into_connection());

        let repo = ChoiceRepository::new(db);
        let found = repo.find_in_question(question_id, choice.id).await.unwrap();

        assert_eq!(found, Some(choice));
    }

    #[tokio::test]
    async fn test_find_in_question_scopes_by_question() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<choice::Model>::new()])
            .into_connection());

        let repo = ChoiceRepository::new(db.clone());
        let found = repo.find_in_question(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        assert!(found.is_none());

        drop(repo);
        let sql = format!("{:?}", transaction_log(db));
        assert!(sql.contains("\\\"choices\\\".\\\"question_id\\\" = $"), "{sql}");
    }

    #[tokio::test]
    async fn test_find_by_question_keeps_order() {
        let question_id = Uuid::new_v4();
        let choices = vec![
            create_test_choice(question_id, "Yes", 0),
            create_test_choice(question_id, "No", 1),
        ];

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([choices.clone()])
            .into_connection());

        let repo = ChoiceRepository::new(db);
        let found = repo.find_by_question(question_id).await.unwrap();

        assert_eq!(found, choices);
    }

    #[tokio::test]
    async fn test_delete_reports_missing_choice() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection());

        let repo = ChoiceRepository::new(db);
        assert!(!repo.delete(Uuid::new_v4(), Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_count_by_questions() {
        let q1 = Uuid::new_v4();
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([
                ("question_id", Value::from(q1)),
                ("choices", Value::BigInt(Some(3))),
            ])]])
            .into_connection());

        let repo = ChoiceRepository::new(db);
        let counts = repo.count_by_questions(&[q1, Uuid::new_v4()]).await.unwrap();

        assert_eq!(counts.get(&q1), Some(&3));
        assert_eq!(counts.len(), 1);
    }

    #[tokio::test]
    async fn test_count_by_questions_empty_input_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = ChoiceRepository::new(db);
        assert!(repo.count_by_questions(&[]).await.unwrap().is_empty());
    }
}
