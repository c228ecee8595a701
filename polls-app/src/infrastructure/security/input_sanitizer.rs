use polls_errors::AppError;
use std::sync::OnceLock;

pub const MAX_TEXT_LENGTH: usize = 200;

pub struct InputSanitizer;

impl InputSanitizer {
    /// Normalises question text: control characters dropped, whitespace runs
    /// collapsed, trimmed. Must end up non-empty and within the column size.
    pub fn question_text(text: &str) -> Result<String, AppError> {
        Self::clean(text, "Question text")
    }

    pub fn choice_text(text: &str) -> Result<String, AppError> {
        Self::clean(text, "Choice text")
    }

    /// Cleans every non-blank entry; blank rows of an inline form are skipped.
    pub fn choice_texts(texts: &[String]) -> Result<Vec<String>, AppError> {
        texts
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| Self::choice_text(t))
            .collect()
    }

    fn clean(text: &str, field: &str) -> Result<String, AppError> {
        let without_controls: String = text
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        let collapsed = whitespace().replace_all(without_controls.trim(), " ").to_string();

        if collapsed.is_empty() {
            return Err(AppError::Validation(format!("{field} must not be empty")));
        }

        if collapsed.chars().count() > MAX_TEXT_LENGTH {
            tracing::warn!(field, length = collapsed.chars().count(), "Rejected over-long text");
            return Err(AppError::Validation(format!(
                "{field} must be at most {MAX_TEXT_LENGTH} characters"
            )));
        }

        Ok(collapsed)
    }
}

fn whitespace() -> &'static regex_lite::Regex {
    static WHITESPACE: OnceLock<regex_lite::Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| regex_lite::Regex::new(r"\s+").expect("valid whitespace pattern"))
}
