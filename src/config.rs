use std::env;
use thiserror::Error;

const DEFAULT_PINTEREST_API_URL: &str = "https://api.pinterest.com/v5";
const DEFAULT_PINTEREST_AUTHORIZE_URL: &str = "https://www.pinterest.com/oauth/";
const DEFAULT_PINTEREST_TOKEN_URL: &str = "https://api.pinterest.com/v5/oauth/token";
const DEFAULT_ANALYSIS_API_URL: &str = "http://localhost:8000";
const DEFAULT_PORT: u16 = 3000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid URL in {var}: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),
}

/// Configuration for the Pinterest match server, loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pinterest OAuth2 client ID
    pub client_id: String,

    /// Pinterest OAuth2 client secret
    pub client_secret: String,

    /// Public origin of this application, without trailing slash
    pub base_url: String,

    /// Pinterest REST API base (overridable for tests)
    pub pinterest_api_url: String,

    /// Pinterest OAuth authorize endpoint
    pub pinterest_authorize_url: String,

    /// Pinterest OAuth token endpoint
    pub pinterest_token_url: String,

    /// Image-analysis backend base URL
    pub analysis_api_url: String,

    /// HTTP server port
    pub port: u16,

    /// Mark session cookies as Secure (enable in production)
    pub cookie_secure: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `PINTEREST_CLIENT_ID`, `PINTEREST_CLIENT_SECRET` and `BASE_URL` are
    /// required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = require_var("PINTEREST_CLIENT_ID")?;
        let client_secret = require_var("PINTEREST_CLIENT_SECRET")?;
        let base_url = normalize_url(require_var("BASE_URL")?, "BASE_URL")?;

        let pinterest_api_url = optional_url("PINTEREST_API_URL", DEFAULT_PINTEREST_API_URL)?;
        let pinterest_authorize_url =
            optional_url("PINTEREST_AUTHORIZE_URL", DEFAULT_PINTEREST_AUTHORIZE_URL)?;
        let pinterest_token_url = optional_url("PINTEREST_TOKEN_URL", DEFAULT_PINTEREST_TOKEN_URL)?;
        let analysis_api_url = optional_url("ANALYSIS_API_URL", DEFAULT_ANALYSIS_API_URL)?;

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Config {
            client_id,
            client_secret,
            base_url,
            pinterest_api_url,
            pinterest_authorize_url,
            pinterest_token_url,
            analysis_api_url,
            port,
            cookie_secure,
        })
    }

    /// Redirect URI registered with Pinterest. Must match exactly what the
    /// provider has on file for this client.
    pub fn redirect_uri(&self) -> String {
        format!("{}/api/auth/callback/pinterest", self.base_url)
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn optional_url(name: &'static str, default: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => normalize_url(value, name),
        _ => Ok(default.trim_end_matches('/').to_string()),
    }
}

fn normalize_url(value: String, var: &'static str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/').to_string();
    url::Url::parse(&trimmed).map_err(|source| ConfigError::InvalidUrl { var, source })?;
    Ok(trimmed)
}
