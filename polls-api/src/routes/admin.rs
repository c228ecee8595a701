//! Question management endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use polls_app::application::{QuestionDraft, QuestionUpdate, SavedQuestion};
use polls_app::domain::{Choice, PublishedFilter, QuestionResults, QuestionSummary};
use polls_app::infrastructure::db::QuestionFilter;
use polls_app::AppContext;
use polls_errors::AppResult;
use serde::Deserialize;
use uuid::Uuid;

use crate::extractors::AdminUser;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub published: Option<PublishedFilter>,
}

impl From<ListParams> for QuestionFilter {
    fn from(params: ListParams) -> Self {
        Self {
            search: params.search,
            published: params.published,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewChoice {
    pub choice_text: String,
}

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route(
            "/questions/{id}",
            get(show_question).put(update_question).delete(delete_question),
        )
        .route("/questions/{id}/choices", post(add_choice))
        .route("/questions/{id}/choices/{choice_id}", delete(remove_choice))
}

async fn list_questions(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<QuestionSummary>>> {
    let rows = ctx.manage.list(&params.into(), chrono::Utc::now()).await?;
    Ok(Json(rows))
}

async fn create_question(
    State(ctx): State<AppContext>,
    AdminUser(admin): AdminUser,
    Json(draft): Json<QuestionDraft>,
) -> AppResult<(StatusCode, Json<SavedQuestion>)> {
    let saved = ctx.manage.create(draft, chrono::Utc::now()).await?;
    tracing::info!(admin = %admin.email, question_id = %saved.question.id, "Admin created question");
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn show_question(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<QuestionResults>> {
    Ok(Json(ctx.manage.get(id).await?))
}

async fn update_question(
    State(ctx): State<AppContext>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(update): Json<QuestionUpdate>,
) -> AppResult<Json<SavedQuestion>> {
    let saved = ctx.manage.update(id, update, chrono::Utc::now()).await?;
    tracing::info!(admin = %admin.email, question_id = %id, "Admin updated question");
    Ok(Json(saved))
}

async fn delete_question(
    State(ctx): State<AppContext>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.manage.delete(id).await?;
    tracing::info!(admin = %admin.email, question_id = %id, "Admin deleted question");
    Ok(StatusCode::NO_CONTENT)
}

async fn add_choice(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<NewChoice>,
) -> AppResult<(StatusCode, Json<Choice>)> {
    let choice = ctx.manage.add_choice(id, &body.choice_text).await?;
    Ok((StatusCode::CREATED, Json(choice)))
}

async fn remove_choice(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    Path((id, choice_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    ctx.manage.remove_choice(id, choice_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_parse_published_buckets() {
        let params: ListParams = serde_json::from_str(r#"{"search":"pizza","published":"past_7_days"}"#).unwrap();
        let filter: QuestionFilter = params.into();
        assert_eq!(filter.search.as_deref(), Some("pizza"));
        assert_eq!(filter.published, Some(PublishedFilter::Past7Days));
    }

    #[test]
    fn list_params_default_to_no_filter() {
        let filter: QuestionFilter = ListParams::default().into();
        assert!(filter.search.is_none());
        assert!(filter.published.is_none());
    }

    #[test]
    fn draft_choices_are_optional() {
        let draft: QuestionDraft = serde_json::from_str(r#"{"question_text":"Lunch?"}"#).unwrap();
        assert!(draft.choices.is_empty());
        assert!(draft.end_date.is_none());
    }
}
