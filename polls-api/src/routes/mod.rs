pub mod admin;
pub mod auth;
pub mod vote;

use axum::{routing::post, Router};
use polls_app::AppContext;

/// Plain axum routes served next to the Leptos pages.
pub fn router(ctx: AppContext) -> Router<leptos::prelude::LeptosOptions> {
    Router::new()
        .route("/polls/{id}/vote", post(vote::submit))
        .nest("/auth", auth::router())
        .nest("/admin/api", admin::router())
        .with_state(ctx)
}
