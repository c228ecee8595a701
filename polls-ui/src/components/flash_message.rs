use leptos::prelude::*;

/// One-shot message carried over a redirect.
#[component]
pub fn FlashMessage(message: Option<String>) -> impl IntoView {
    message.map(|message| {
        view! {
            <p class="flash" role="alert">
                <strong>{message}</strong>
            </p>
        }
    })
}
