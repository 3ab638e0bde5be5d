use serde::Deserialize;
use thiserror::Error;

/// Token endpoint response for the authorization-code grant.
///
/// Pinterest returns `access_token`, `token_type`, `expires_in`,
/// `refresh_token` and `scope`; only the access token is required here since
/// the session cookie stores nothing else.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid OAuth URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("State parameter missing or does not match stored value")]
    StateMismatch,

    #[error("Authorization code missing from callback")]
    MissingCode,

    #[error("Token exchange failed with status {status}: {body}")]
    TokenExchangeFailed { status: u16, body: String },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}
