use crate::components::{error_message, AuthSection, ErrorDisplay, FlashMessage, LoadingSpinner};
use leptos::prelude::*;
use polls_app::domain::{Question, User};
use serde::{Deserialize, Serialize};
use server_fn::ServerFnError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexData {
    pub questions: Vec<Question>,
    pub flash: Option<String>,
    pub user: Option<User>,
}

#[server(IndexDataFn, "/api", endpoint = "index")]
pub async fn index_data() -> Result<IndexData, ServerFnError> {
    use crate::server::{current_user, page_error, session, take_flash};
    use polls_app::AppContext;

    let ctx = expect_context::<AppContext>();
    let session = session().await?;

    let questions = ctx.browse.latest(chrono::Utc::now()).await.map_err(page_error)?;

    Ok(IndexData {
        questions,
        flash: take_flash(&session).await,
        user: current_user(&ctx, &session).await,
    })
}

#[component]
pub fn IndexPage() -> impl IntoView {
    let data = Resource::new(|| (), |_| index_data());

    view! {
        <div class="hero">
            <h1 class="hero__title">"Polls"</h1>
            <p class="hero__subtitle">"Pick a question and cast your vote."</p>
        </div>

        <Suspense fallback=move || view! { <LoadingSpinner/> }>
            {move || {
                data.get().map(|result| match result {
                    Ok(data) => view! {
                        <AuthSection user=data.user/>
                        <FlashMessage message=data.flash/>
                        <QuestionList questions=data.questions/>
                    }.into_any(),
                    Err(e) => view! { <ErrorDisplay message=error_message(&e)/> }.into_any(),
                })
            }}
        </Suspense>
    }
}

#[component]
fn QuestionList(questions: Vec<Question>) -> impl IntoView {
    if questions.is_empty() {
        return view! { <p class="polls__empty">"No polls are available."</p> }.into_any();
    }

    view! {
        <ul class="polls">
            {questions.into_iter().map(|question| {
                view! {
                    <li class="polls__item">
                        <a href=format!("/polls/{}", question.id) class="polls__link">
                            {question.question_text}
                        </a>
                        <a href=format!("/polls/{}/results", question.id) class="polls__results">
                            "Results"
                        </a>
                    </li>
                }
            }).collect::<Vec<_>>()}
        </ul>
    }.into_any()
}
