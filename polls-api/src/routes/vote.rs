use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use polls_app::application::Ballot;
use polls_app::AppContext;
use polls_errors::AppError;
use polls_ui::server::{current_user_id, set_flash};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct VoteForm {
    choice: Option<String>,
}

/// `POST /polls/{id}/vote`
pub async fn submit(
    State(ctx): State<AppContext>,
    session: Session,
    Path(question_id): Path<String>,
    Form(form): Form<VoteForm>,
) -> Response {
    let Ok(question_id) = Uuid::parse_str(&question_id) else {
        return AppError::NotFound.into_response();
    };

    let Some(user_id) = current_user_id(&session).await else {
        return Redirect::to("/auth/login").into_response();
    };

    let ballot = Ballot {
        question_id,
        user_id,
        choice: form.choice,
    };

    match ctx.cast_vote.execute(ballot, chrono::Utc::now()).await {
        Ok(result) => Redirect::to(&format!("/polls/{}/results", result.question_id)).into_response(),
        Err(err) => match rejection_target(question_id, &err) {
            Some(target) => {
                set_flash(&session, err.user_message()).await;
                Redirect::to(&target).into_response()
            }
            None => err.into_response(),
        },
    }
}

fn detail_path(question_id: Uuid) -> String {
    format!("/polls/{question_id}")
}

/// Where a rejected ballot sends the voter back to, with the error flashed.
/// `None` for errors answered directly.
fn rejection_target(question_id: Uuid, err: &AppError) -> Option<String> {
    match err {
        AppError::NotVotable(_) => Some("/".to_string()),
        AppError::RateLimited(_) => Some(detail_path(question_id)),
        err if err.is_selection_error() => Some(detail_path(question_id)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_errors_return_to_the_form() {
        let id = Uuid::new_v4();
        assert_eq!(rejection_target(id, &AppError::MissingSelection), Some(format!("/polls/{id}")));
        assert_eq!(rejection_target(id, &AppError::InvalidSelection), Some(format!("/polls/{id}")));
    }

    #[test]
    fn closed_poll_returns_to_index() {
        let target = rejection_target(Uuid::new_v4(), &AppError::NotVotable("Q".into()));
        assert_eq!(target.as_deref(), Some("/"));
    }

    #[test]
    fn rate_limited_vote_returns_to_the_form() {
        let id = Uuid::new_v4();
        let err = AppError::RateLimited("Too many votes! Please wait 30 seconds.".into());
        assert_eq!(rejection_target(id, &err), Some(format!("/polls/{id}")));
    }

    #[test]
    fn unknown_question_is_answered_directly() {
        assert_eq!(rejection_target(Uuid::new_v4(), &AppError::NotFound), None);
    }
}
