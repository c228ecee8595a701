mod auth_section;
mod error_display;
mod flash_message;
mod loading_spinner;

pub use auth_section::AuthSection;
pub use error_display::{error_message, ErrorDisplay};
pub use flash_message::FlashMessage;
pub use loading_spinner::LoadingSpinner;
