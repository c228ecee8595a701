pub mod components;
pub mod pages;

#[cfg(feature = "ssr")]
pub mod server;

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::{path, SsrMode};

use pages::{DetailPage, IndexPage, ResultsPage};

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Polls"/>
        <Meta name="description" content="Vote on the latest questions"/>

        <Router>
            <main class="container">
                <Routes fallback=|| "Page not found.">
                    <Route path=path!("/") view=IndexPage ssr=SsrMode::Async/>
                    <Route path=path!("/polls/:id") view=DetailPage ssr=SsrMode::Async/>
                    <Route path=path!("/polls/:id/results") view=ResultsPage ssr=SsrMode::Async/>
                </Routes>
            </main>
        </Router>
    }
}

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
