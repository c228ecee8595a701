use crate::components::{error_message, ErrorDisplay, FlashMessage, LoadingSpinner};
use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use polls_app::domain::QuestionDetail;
use serde::{Deserialize, Serialize};
use server_fn::ServerFnError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailData {
    pub detail: QuestionDetail,
    pub flash: Option<String>,
    pub logged_in: bool,
}

/// Loads the voting form. A question outside its voting window sends the
/// visitor back to the index with an error message.
#[server(QuestionDetailFn, "/api", endpoint = "question_detail")]
pub async fn question_detail(question_id: String) -> Result<DetailData, ServerFnError> {
    use crate::server::{current_user_id, not_found, page_error, session, set_flash, take_flash};
    use polls_app::AppContext;
    use polls_errors::AppError;

    let ctx = expect_context::<AppContext>();
    let session = session().await?;
    let question_id = uuid::Uuid::parse_str(&question_id).map_err(|_| not_found())?;
    let viewer = current_user_id(&session).await;

    match ctx.browse.detail(question_id, viewer, chrono::Utc::now()).await {
        Ok(detail) => Ok(DetailData {
            detail,
            flash: take_flash(&session).await,
            logged_in: viewer.is_some(),
        }),
        Err(err @ AppError::NotVotable(_)) => {
            set_flash(&session, err.user_message()).await;
            leptos_axum::redirect("/");
            Err(ServerFnError::new(err.user_message()))
        }
        Err(err) => Err(page_error(err)),
    }
}

#[component]
pub fn DetailPage() -> impl IntoView {
    let params = use_params_map();
    let data = Resource::new(
        move || params.read().get("id").unwrap_or_default(),
        question_detail,
    );

    view! {
        <Suspense fallback=move || view! { <LoadingSpinner/> }>
            {move || {
                data.get().map(|result| match result {
                    Ok(data) => view! { <VoteForm data/> }.into_any(),
                    Err(e) => view! { <ErrorDisplay message=error_message(&e)/> }.into_any(),
                })
            }}
        </Suspense>
    }
}

#[component]
fn VoteForm(data: DetailData) -> impl IntoView {
    let DetailData { detail, flash, logged_in } = data;
    let question_id = detail.question.id;
    let selected = detail.selected_choice_id;

    view! {
        <div class="poll">
            <h1 class="poll__title">{detail.question.question_text}</h1>
            <FlashMessage message=flash/>
            <form action=format!("/polls/{question_id}/vote") method="post" class="poll__form">
                <fieldset class="poll__choices">
                    {detail.choices.into_iter().map(|choice| {
                        let input_id = format!("choice-{}", choice.id);
                        view! {
                            <label class="poll__choice" for=input_id.clone()>
                                <input
                                    type="radio"
                                    name="choice"
                                    id=input_id.clone()
                                    value={choice.id.to_string()}
                                    checked={selected == Some(choice.id)}
                                />
                                {choice.choice_text}
                            </label>
                        }
                    }).collect::<Vec<_>>()}
                </fieldset>
                {if logged_in {
                    view! { <button type="submit" class="poll__button">"Vote"</button> }.into_any()
                } else {
                    view! { <a href="/auth/login" class="poll__button">"Log in to vote"</a> }.into_any()
                }}
            </form>
            <a href=format!("/polls/{question_id}/results") class="poll__link">"View results"</a>
        </div>
    }
}
