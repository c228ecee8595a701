mod extractors;
mod routes;

use axum::{routing::post, Router};
use leptos::prelude::*;
use leptos_axum::{generate_route_list, handle_server_fns_with_context, LeptosRoutes};
use polls_app::config::AppConfig;
use polls_app::AppContext;
use polls_ui::pages::{IndexDataFn, QuestionDetailFn, QuestionResultsFn};
use polls_ui::App;
use tower_http::compression::CompressionLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let conf = get_configuration(Some("Cargo.toml")).expect("Failed to load Leptos config");
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;

    let app_context = match AppConfig::from_env() {
        Ok(config) => match AppContext::connect(config).await {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::error!("Failed to start: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let routes = generate_route_list(App);

    server_fn::axum::register_explicit::<IndexDataFn>();
    server_fn::axum::register_explicit::<QuestionDetailFn>();
    server_fn::axum::register_explicit::<QuestionResultsFn>();

    // Lax so the session survives the redirect back from the OAuth provider.
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(7)));

    let app = Router::new()
        .merge(routes::router(app_context.clone()))
        .route("/api/{*fn_name}", post({
            let ctx = app_context.clone();
            move |req| {
                let ctx = ctx.clone();
                async move {
                    handle_server_fns_with_context(
                        move || provide_context(ctx.clone()),
                        req
                    ).await
                }
            }
        }))
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            {
                let ctx = app_context.clone();
                move || provide_context(ctx.clone())
            },
            {
                let leptos_options = leptos_options.clone();
                move || shell(leptos_options.clone())
            },
        )
        .fallback(leptos_axum::file_and_error_handler(shell))
        .layer(session_layer)
        .layer(CompressionLayer::new())
        .with_state(leptos_options);

    tracing::info!("Listening on http://{}", addr);
    tracing::info!(
        admins = app_context.config.admin_emails.len(),
        login_enabled = app_context.oauth.is_some(),
        "Polls ready. Vote rate limit 10/min, 60/hour per user"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}

const CSS: &str = r#"
:root {
    --base: #faf4ed;
    --surface: #fffaf3;
    --overlay: #f2e9e1;
    --muted: #9893a5;
    --subtle: #797593;
    --text: #575279;
    --love: #b4637a;
    --gold: #ea9d34;
    --pine: #286983;
    --foam: #56949f;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
    font-family: 'Inter', -apple-system, sans-serif;
    background: var(--base);
    color: var(--text);
    min-height: 100vh;
}
a { color: var(--pine); }
.container { max-width: 720px; margin: 0 auto; padding: 1.5rem; }
.hero { text-align: center; padding: 2.5rem 0 1.5rem; }
.hero__title { font-size: clamp(2rem, 5vw, 2.75rem); color: var(--pine); font-weight: 800; margin-bottom: 0.5rem; }
.hero__subtitle { color: var(--subtle); font-size: 1.1rem; }
.auth-section { display: flex; align-items: center; justify-content: space-between; gap: 1rem; margin: 1rem 0; }
.auth-section__hint { color: var(--muted); font-size: 0.9rem; }
.login-btn, .logout-btn, .poll__button {
    display: inline-block; padding: 0.6rem 1.25rem; background: var(--pine); color: var(--base);
    border: none; border-radius: 8px; font-weight: 600; cursor: pointer; text-decoration: none;
}
.logout-btn { background: var(--muted); }
.user-info { display: flex; align-items: center; gap: 0.75rem; }
.user-info__avatar { width: 36px; height: 36px; border-radius: 50%; }
.user-info__details { display: flex; flex-direction: column; }
.user-info__email { color: var(--muted); font-size: 0.85rem; }
.flash { background: #fce8ec; border: 2px solid var(--love); color: #8b3d4d; border-radius: 8px; padding: 0.75rem 1rem; margin: 1rem 0; }
.polls { list-style: none; margin: 1.5rem 0; }
.polls__item {
    display: flex; justify-content: space-between; align-items: center;
    background: var(--surface); border: 2px solid var(--overlay); border-radius: 10px;
    padding: 1rem 1.25rem; margin-bottom: 0.75rem;
}
.polls__link { font-weight: 600; text-decoration: none; }
.polls__results { color: var(--subtle); font-size: 0.9rem; }
.polls__empty { color: var(--muted); text-align: center; margin: 2rem 0; }
.poll, .results { background: var(--surface); border: 2px solid var(--overlay); border-radius: 12px; padding: 1.5rem; margin: 2rem 0; }
.poll__title, .results__title { color: var(--pine); font-size: 1.4rem; margin-bottom: 1rem; }
.poll__choices { border: none; margin: 1rem 0; }
.poll__choice { display: block; padding: 0.5rem 0; cursor: pointer; }
.poll__choice input { margin-right: 0.5rem; }
.poll__link { display: inline-block; margin-top: 1rem; }
.results__list { list-style: none; }
.results__item { margin-bottom: 1rem; }
.results__choice { font-weight: 600; margin-right: 0.5rem; }
.results__votes { color: var(--subtle); }
.results__bar { height: 8px; background: var(--gold); border-radius: 4px; margin-top: 0.35rem; }
.results__total { margin: 1rem 0; font-weight: 600; }
.loading { display: flex; flex-direction: column; align-items: center; padding: 3rem; }
.loading__spinner {
    width: 40px; height: 40px; border: 4px solid var(--overlay);
    border-top-color: var(--gold); border-radius: 50%; animation: spin 1s linear infinite;
}
@keyframes spin { to { transform: rotate(360deg); } }
.loading__text { margin-top: 1rem; color: var(--subtle); font-style: italic; }
.error { background: #fce8ec; border: 2px solid var(--love); border-radius: 8px; padding: 1.25rem; margin: 2rem 0; }
.error__title { color: var(--love); font-weight: 700; margin-bottom: 0.5rem; }
.error__message { color: #8b3d4d; }
.error__retry { display: inline-block; margin-top: 1rem; padding: 0.5rem 1rem; background: var(--love); color: var(--base); border-radius: 4px; text-decoration: none; }
"#;

fn shell(_options: LeptosOptions) -> impl IntoView {
    use leptos_meta::*;

    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>"Polls"</title>
                <style>{CSS}</style>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}
