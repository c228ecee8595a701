use leptos::prelude::*;
use server_fn::ServerFnError;

/// The message a server function failed with, without the transport prefix.
pub fn error_message(err: &ServerFnError) -> String {
    match err {
        ServerFnError::ServerError(message) => message.clone(),
        other => other.to_string(),
    }
}

#[component]
pub fn ErrorDisplay(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="error">
            <p class="error__title">"Something went wrong"</p>
            <p class="error__message">{message}</p>
            <a href="/" class="error__retry">"Back to polls"</a>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_message_is_unwrapped() {
        let err = ServerFnError::new("That poll does not exist.");
        assert_eq!(error_message(&err), "That poll does not exist.");
    }
}
