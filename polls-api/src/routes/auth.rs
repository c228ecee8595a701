use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use polls_app::domain::User;
use polls_app::AppContext;
use polls_errors::AppError;
use polls_ui::server::{current_user, set_flash, OAUTH_STATE_KEY, PKCE_VERIFIER_KEY, USER_ID_KEY};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

const LOGIN_FAILED: &str = "Login failed. Please try again.";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
pub struct MeResponse {
    authenticated: bool,
    user: Option<User>,
}

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn login(State(ctx): State<AppContext>, session: Session) -> Response {
    let Some(oauth) = ctx.oauth.as_ref() else {
        set_flash(&session, "Login is not available.").await;
        return Redirect::to("/").into_response();
    };

    let redirect = oauth.authorize();

    let stored = async {
        session.insert(OAUTH_STATE_KEY, redirect.csrf_state).await?;
        session.insert(PKCE_VERIFIER_KEY, redirect.pkce_verifier).await
    };
    if let Err(e) = stored.await {
        tracing::error!(error = %e, "Failed to store login state");
        return AppError::Internal(e.to_string()).into_response();
    }

    Redirect::to(&redirect.url).into_response()
}

async fn callback(State(ctx): State<AppContext>, session: Session, Query(params): Query<CallbackParams>) -> Response {
    match complete_login(&ctx, &session, params).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User logged in");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            set_flash(&session, LOGIN_FAILED).await;
            Redirect::to("/").into_response()
        }
    }
}

async fn complete_login(ctx: &AppContext, session: &Session, params: CallbackParams) -> Result<User, AppError> {
    let oauth = ctx.oauth.as_ref().ok_or(AppError::Unauthorized)?;

    if let Some(error) = params.error {
        return Err(AppError::Internal(format!("provider returned error: {error}")));
    }

    let expected_state: Option<String> = session.remove(OAUTH_STATE_KEY).await.map_err(session_error)?;
    let pkce_verifier: Option<String> = session.remove(PKCE_VERIFIER_KEY).await.map_err(session_error)?;

    let (Some(expected_state), Some(pkce_verifier)) = (expected_state, pkce_verifier) else {
        return Err(AppError::Unauthorized);
    };
    if params.state.as_deref() != Some(expected_state.as_str()) {
        return Err(AppError::Unauthorized);
    }
    let code = params.code.ok_or(AppError::Unauthorized)?;

    let profile = oauth.exchange_code(&code, pkce_verifier).await?;
    let model = ctx
        .user_repo
        .upsert(&profile.into_user())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    session.cycle_id().await.map_err(session_error)?;
    session.insert(USER_ID_KEY, model.id).await.map_err(session_error)?;

    Ok(model.into())
}

async fn logout(session: Session) -> Response {
    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    Redirect::to("/").into_response()
}

async fn me(State(ctx): State<AppContext>, session: Session) -> Json<MeResponse> {
    let user = current_user(&ctx, &session).await;
    Json(MeResponse {
        authenticated: user.is_some(),
        user,
    })
}

fn session_error(e: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("session error: {e}"))
}
