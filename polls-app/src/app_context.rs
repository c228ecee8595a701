use crate::application::{BrowsePolls, CastVote, ManageQuestions};
use crate::config::AppConfig;
use crate::infrastructure::auth::OAuthLogin;
use crate::infrastructure::db::{
    create_connection, run_migrations, ChoiceRepository, QuestionRepository, UserRepository, VoteRepository,
};
use crate::infrastructure::security::RateLimiter;
use polls_errors::AppError;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub browse: Arc<BrowsePolls>,
    pub cast_vote: Arc<CastVote>,
    pub manage: Arc<ManageQuestions>,
    pub user_repo: UserRepository,
    /// `None` when no OAuth client is configured.
    pub oauth: Option<OAuthLogin>,
}

impl AppContext {
    /// Opens the pool, applies migrations and wires the services.
    pub async fn connect(config: AppConfig) -> Result<Self, AppError> {
        let db = create_connection(&config.database_url, config.db_max_connections)
            .await
            .map_err(|e| AppError::Config(format!("failed to connect to database: {e}")))?;

        run_migrations(&db)
            .await
            .map_err(|e| AppError::Config(format!("failed to run migrations: {e}")))?;

        Self::new(Arc::new(db), config)
    }

    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig) -> Result<Self, AppError> {
        let oauth = match &config.oauth {
            Some(settings) => Some(OAuthLogin::new(settings)?),
            None => {
                tracing::warn!("OAuth is not configured; login and voting are disabled");
                None
            }
        };

        let questions = QuestionRepository::new(db.clone());
        let choices = ChoiceRepository::new(db.clone());
        let votes = VoteRepository::new(db.clone());

        let browse = Arc::new(BrowsePolls::new(questions.clone(), choices.clone(), votes.clone()));

        Ok(Self {
            cast_vote: Arc::new(CastVote::new(questions.clone(), choices.clone(), votes, RateLimiter::new())),
            manage: Arc::new(ManageQuestions::new(questions, choices, browse.clone())),
            browse,
            user_repo: UserRepository::new(db),
            oauth,
            config: Arc::new(config),
        })
    }
}
