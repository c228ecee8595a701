//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use polls_app::domain::User;
use polls_app::AppContext;
use polls_errors::AppError;
use polls_ui::server::current_user;
use tower_sessions::Session;

/// Logged-in user whose email is listed in `ADMIN_EMAILS`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppContext> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, ctx: &AppContext) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, ctx)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;

        let user = current_user(ctx, &session).await.ok_or(AppError::Unauthorized)?;

        if !ctx.config.is_admin(&user.email) {
            tracing::warn!(user_id = %user.id, "Admin API access denied");
            return Err(AppError::Forbidden);
        }

        Ok(Self(user))
    }
}
