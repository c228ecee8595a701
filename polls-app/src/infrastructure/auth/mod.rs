mod oauth;

pub use oauth::{LoginRedirect, OAuthLogin, ProviderUserInfo};
