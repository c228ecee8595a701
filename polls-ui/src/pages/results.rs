use crate::components::{error_message, ErrorDisplay, LoadingSpinner};
use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use polls_app::domain::QuestionResults;
use server_fn::ServerFnError;

#[server(QuestionResultsFn, "/api", endpoint = "question_results")]
pub async fn question_results(question_id: String) -> Result<QuestionResults, ServerFnError> {
    use crate::server::{not_found, page_error};
    use polls_app::AppContext;

    let ctx = expect_context::<AppContext>();
    let question_id = uuid::Uuid::parse_str(&question_id).map_err(|_| not_found())?;

    ctx.browse.results(question_id).await.map_err(page_error)
}

#[component]
pub fn ResultsPage() -> impl IntoView {
    let params = use_params_map();
    let results = Resource::new(
        move || params.read().get("id").unwrap_or_default(),
        question_results,
    );

    view! {
        <Suspense fallback=move || view! { <LoadingSpinner/> }>
            {move || {
                results.get().map(|result| match result {
                    Ok(results) => view! { <Tally results/> }.into_any(),
                    Err(e) => view! { <ErrorDisplay message=error_message(&e)/> }.into_any(),
                })
            }}
        </Suspense>
    }
}

#[component]
fn Tally(results: QuestionResults) -> impl IntoView {
    let total = results.total_votes();
    let question_id = results.question.id;
    let rows = results
        .choices
        .iter()
        .map(|tally| (tally.choice_text.clone(), tally.votes, results.share(tally)))
        .collect::<Vec<_>>();

    view! {
        <div class="results">
            <h1 class="results__title">{results.question.question_text}</h1>
            <ul class="results__list">
                {rows.into_iter().map(|(text, votes, share)| {
                    let plural = if votes == 1 { "vote" } else { "votes" };
                    view! {
                        <li class="results__item">
                            <span class="results__choice">{text}</span>
                            <span class="results__votes">
                                {format!("{votes} {plural} ({share:.0}%)")}
                            </span>
                            <div class="results__bar" style={format!("width: {share:.1}%")}></div>
                        </li>
                    }
                }).collect::<Vec<_>>()}
            </ul>
            <p class="results__total">{format!("Total votes: {total}")}</p>
            <a href=format!("/polls/{question_id}") class="results__again">"Vote again?"</a>
            " "
            <a href="/" class="results__back">"Back to polls"</a>
        </div>
    }
}
