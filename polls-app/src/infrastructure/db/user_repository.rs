use super::entities::{user, User};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user::Model>, DbErr> {
        User::find_by_id(id).one(self.db.as_ref()).await
    }

    pub async fn find_by_subject(&self, provider_subject: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::ProviderSubject.eq(provider_subject))
            .one(self.db.as_ref())
            .await
    }

    /// Creates the user on first login, refreshes the profile afterwards.
    pub async fn upsert(&self, user_data: &crate::domain::User) -> Result<user::Model, DbErr> {
        if let Some(existing) = self.find_by_subject(&user_data.provider_subject).await? {
            let mut active: user::ActiveModel = existing.into();
            active.email = Set(user_data.email.clone());
            active.name = Set(user_data.name.clone());
            active.avatar_url = Set(user_data.avatar_url.clone());
            active.updated_at = Set(Some(Utc::now()));
            active.update(self.db.as_ref()).await
        } else {
            let active = user::ActiveModel {
                id: Set(user_data.id),
                provider_subject: Set(user_data.provider_subject.clone()),
                email: Set(user_data.email.clone()),
                name: Set(user_data.name.clone()),
                avatar_url: Set(user_data.avatar_url.clone()),
                created_at: Set(Some(Utc::now())),
                updated_at: Set(Some(Utc::now())),
            };
            active.insert(self.db.as_ref()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(subject: &str) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            provider_subject: subject.to_string(),
            email: format!("{subject}@example.com"),
            name: "Test User".to_string(),
            avatar_url: None,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_find_by_subject_found() {
        let user = create_test_user("sub-1");

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection());

        let repo = UserRepository::new(db);
        let found = repo.find_by_subject("sub-1").await.unwrap();

        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_upsert_updates_existing_user() {
        let existing = create_test_user("sub-2");
        let mut refreshed = existing.clone();
        refreshed.name = "Renamed".to_string();

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing.clone()]])
            .append_query_results([[refreshed.clone()]])
            .into_connection());

        let repo = UserRepository::new(db);
        let incoming = crate::domain::User::new(
            "sub-2".to_string(),
            existing.email.clone(),
            "Renamed".to_string(),
            None,
        );
        let saved = repo.upsert(&incoming).await.unwrap();

        assert_eq!(saved.id, existing.id);
        assert_eq!(saved.name, "Renamed");
    }
}
