use crate::config::OAuthSettings;
use crate::domain::User;
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use polls_errors::AppError;
use serde::Deserialize;

/// Profile returned by an OpenID Connect userinfo endpoint.
#[derive(Debug, Deserialize)]
pub struct ProviderUserInfo {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

impl ProviderUserInfo {
    pub fn into_user(self) -> User {
        User::new(self.sub, self.email, self.name, self.picture)
    }
}

/// State the login redirect must carry to the callback.
pub struct LoginRedirect {
    pub url: String,
    pub csrf_state: String,
    pub pkce_verifier: String,
}

type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointSet,
>;

/// Authorization-code + PKCE login against the configured provider.
#[derive(Clone)]
pub struct OAuthLogin {
    client: ConfiguredClient,
    redirect_uri: RedirectUrl,
    userinfo_url: String,
    oauth_http: oauth2::reqwest::Client,
    http_client: reqwest::Client,
}

impl OAuthLogin {
    pub fn new(settings: &OAuthSettings) -> Result<Self, AppError> {
        let invalid = |what: &str, e: oauth2::url::ParseError| AppError::Config(format!("invalid {what}: {e}"));

        let auth_url = AuthUrl::new(settings.auth_url.clone()).map_err(|e| invalid("OAUTH_AUTH_URL", e))?;
        let token_url = TokenUrl::new(settings.token_url.clone()).map_err(|e| invalid("OAUTH_TOKEN_URL", e))?;
        let redirect =
            RedirectUrl::new(settings.redirect_url.clone()).map_err(|e| invalid("OAUTH_REDIRECT_URL", e))?;

        let client = BasicClient::new(ClientId::new(settings.client_id.clone()))
            .set_client_secret(ClientSecret::new(settings.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url);

        // token endpoints must not be followed through redirects
        let oauth_http = oauth2::reqwest::ClientBuilder::new()
            .redirect(oauth2::reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            redirect_uri: redirect,
            userinfo_url: settings.userinfo_url.clone(),
            oauth_http,
            http_client: reqwest::Client::new(),
        })
    }

    pub fn authorize(&self) -> LoginRedirect {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_redirect_uri(std::borrow::Cow::Borrowed(&self.redirect_uri))
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        LoginRedirect {
            url: auth_url.to_string(),
            csrf_state: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        }
    }

    /// Trades the callback code for a token and loads the user's profile.
    pub async fn exchange_code(&self, code: &str, pkce_verifier: String) -> Result<ProviderUserInfo, AppError> {
        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_redirect_uri(std::borrow::Cow::Borrowed(&self.redirect_uri))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&self.oauth_http)
            .await
            .map_err(|e| AppError::Internal(format!("token exchange failed: {e:?}")))?;

        let access_token = token_result.access_token().secret();

        self.http_client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Internal(format!("failed to fetch user info: {e}")))?
            .json::<ProviderUserInfo>()
            .await
            .map_err(|e| AppError::Internal(format!("failed to parse user info: {e}")))
    }
}
