use polls_errors::AppError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    /// Login is disabled when no client is configured.
    pub oauth: Option<OAuthSettings>,
    /// Lower-cased emails allowed into the admin API.
    pub admin_emails: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").ok_or_else(|| AppError::Config("DATABASE_URL must be set".into()))?;

        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::Config(format!("DB_MAX_CONNECTIONS must be a positive integer, got {raw:?}")))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let oauth = match (var("OAUTH_CLIENT_ID"), var("OAUTH_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(OAuthSettings {
                client_id,
                client_secret,
                redirect_url: var("OAUTH_REDIRECT_URL")
                    .ok_or_else(|| AppError::Config("OAUTH_REDIRECT_URL must be set with OAUTH_CLIENT_ID".into()))?,
                auth_url: var("OAUTH_AUTH_URL").unwrap_or_else(|| GOOGLE_AUTH_URL.to_string()),
                token_url: var("OAUTH_TOKEN_URL").unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
                userinfo_url: var("OAUTH_USERINFO_URL").unwrap_or_else(|| GOOGLE_USERINFO_URL.to_string()),
            }),
            (None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "OAUTH_CLIENT_ID and OAUTH_CLIENT_SECRET must be set together".into(),
                ))
            }
        };

        let admin_emails = var("ADMIN_EMAILS")
            .map(|raw| {
                raw.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            db_max_connections,
            oauth,
            admin_emails,
        })
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(config(&[]), Err(AppError::Config(msg)) if msg.contains("DATABASE_URL")));
    }

    #[test]
    fn defaults() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/polls")]).unwrap();
        assert_eq!(cfg.db_max_connections, 10);
        assert!(cfg.oauth.is_none());
        assert!(cfg.admin_emails.is_empty());
    }

    #[test]
    fn oauth_defaults_to_google_endpoints() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://localhost/polls"),
            ("OAUTH_CLIENT_ID", "id"),
            ("OAUTH_CLIENT_SECRET", "secret"),
            ("OAUTH_REDIRECT_URL", "http://localhost:3000/auth/callback"),
        ])
        .unwrap();
        let oauth = cfg.oauth.unwrap();
        assert_eq!(oauth.auth_url, GOOGLE_AUTH_URL);
        assert_eq!(oauth.userinfo_url, GOOGLE_USERINFO_URL);
    }

    #[test]
    fn half_configured_oauth_is_an_error() {
        let result = config(&[("DATABASE_URL", "postgres://localhost/polls"), ("OAUTH_CLIENT_ID", "id")]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn invalid_pool_size() {
        let result = config(&[("DATABASE_URL", "sqlite::memory:"), ("DB_MAX_CONNECTIONS", "0")]);
        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("DB_MAX_CONNECTIONS")));
    }

    #[test]
    fn admin_emails_are_case_insensitive() {
        let cfg = config(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_EMAILS", " Admin@Example.com, ,ops@example.com"),
        ])
        .unwrap();
        assert_eq!(cfg.admin_emails, vec!["admin@example.com", "ops@example.com"]);
        assert!(cfg.is_admin("ADMIN@example.com"));
        assert!(!cfg.is_admin("someone@example.com"));
    }
}
