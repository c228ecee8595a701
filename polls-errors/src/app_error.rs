use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Question not found")]
    NotFound,

    #[error("Poll \"{0}\" is no longer available for voting")]
    NotVotable(String),

    #[error("No choice selected")]
    MissingSelection,

    #[error("No such choice for this question")]
    InvalidSelection,

    #[error("Login required")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message safe to show to a visitor. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound => "That poll does not exist.".to_string(),
            Self::NotVotable(text) => format!("Error: poll \"{text}\" is no longer available for voting."),
            Self::MissingSelection | Self::InvalidSelection => "You didn't select a choice.".to_string(),
            Self::Unauthorized => "Please log in to vote.".to_string(),
            Self::Forbidden => "You are not allowed to do that.".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::RateLimited(msg) => msg.clone(),
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                "Something went wrong on our side. Please try again later.".to_string()
            }
        }
    }

    pub fn is_selection_error(&self) -> bool {
        matches!(self, Self::MissingSelection | Self::InvalidSelection)
    }
}

#[cfg(feature = "ssr")]
mod ssr_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        message: String,
    }

    impl AppError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AppError::NotFound => StatusCode::NOT_FOUND,
                AppError::NotVotable(_) => StatusCode::FORBIDDEN,
                AppError::MissingSelection | AppError::InvalidSelection => StatusCode::UNPROCESSABLE_ENTITY,
                AppError::Unauthorized => StatusCode::UNAUTHORIZED,
                AppError::Forbidden => StatusCode::FORBIDDEN,
                AppError::Validation(_) => StatusCode::BAD_REQUEST,
                AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            let message = self.user_message();
            (status, Json(ErrorResponse { message })).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_errors_share_the_form_message() {
        assert_eq!(AppError::MissingSelection.user_message(), "You didn't select a choice.");
        assert_eq!(
            AppError::InvalidSelection.user_message(),
            AppError::MissingSelection.user_message()
        );
        assert!(AppError::InvalidSelection.is_selection_error());
        assert!(!AppError::NotFound.is_selection_error());
    }

    #[test]
    fn not_votable_names_the_question() {
        let err = AppError::NotVotable("Best editor?".to_string());
        assert_eq!(
            err.user_message(),
            "Error: poll \"Best editor?\" is no longer available for voting."
        );
    }

    #[test]
    fn internal_details_are_hidden() {
        let err = AppError::Database("connection refused on 10.0.0.3".to_string());
        assert!(!err.user_message().contains("10.0.0.3"));
        assert!(err.to_string().contains("10.0.0.3"));
    }

    #[cfg(feature = "ssr")]
    #[test]
    fn status_codes() {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        assert_eq!(AppError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::RateLimited("slow down".into()).into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
