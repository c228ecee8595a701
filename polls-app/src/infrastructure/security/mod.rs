mod input_sanitizer;
mod rate_limiter;

pub use input_sanitizer::{InputSanitizer, MAX_TEXT_LENGTH};
pub use rate_limiter::{RateLimitError, RateLimiter};
