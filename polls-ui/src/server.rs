//! Session helpers shared by the server functions and the axum handlers.

use polls_app::domain::User;
use polls_app::AppContext;
use polls_errors::AppError;
use server_fn::ServerFnError;
use tower_sessions::Session;
use uuid::Uuid;

pub const USER_ID_KEY: &str = "user_id";
pub const OAUTH_STATE_KEY: &str = "oauth_state";
pub const PKCE_VERIFIER_KEY: &str = "pkce_verifier";
const FLASH_KEY: &str = "flash";

pub async fn current_user_id(session: &Session) -> Option<Uuid> {
    session.get::<Uuid>(USER_ID_KEY).await.ok().flatten()
}

pub async fn current_user(ctx: &AppContext, session: &Session) -> Option<User> {
    let user_id = current_user_id(session).await?;

    match ctx.user_repo.find_by_id(user_id).await {
        Ok(model) => model.map(User::from),
        Err(e) => {
            tracing::error!(error = %e, user_id = %user_id, "Failed to load session user");
            None
        }
    }
}

/// Queues a one-shot message for the next rendered page.
pub async fn set_flash(session: &Session, message: impl Into<String>) {
    if let Err(e) = session.insert(FLASH_KEY, message.into()).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

pub async fn take_flash(session: &Session) -> Option<String> {
    session.remove::<String>(FLASH_KEY).await.ok().flatten()
}

pub async fn session() -> Result<Session, ServerFnError> {
    leptos_axum::extract::<Session>().await.map_err(Into::into)
}

/// Maps a failed page load onto the HTTP response and the error shown in place.
pub fn page_error(err: AppError) -> ServerFnError {
    if let Some(response) = leptos::prelude::use_context::<leptos_axum::ResponseOptions>() {
        response.set_status(err.status_code());
    }
    ServerFnError::new(err.user_message())
}

pub fn not_found() -> ServerFnError {
    page_error(AppError::NotFound)
}
