use super::types::{AuthError, TokenResponse};
use crate::config::Config;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use oauth2::{basic::BasicClient, AuthUrl, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope};
use rand::Rng;
use reqwest::header;
use std::time::Duration;
use tracing::error;

/// Scopes requested from Pinterest (comma-joined, as the v5 API expects)
const OAUTH_SCOPES: &str = "boards:read,pins:read";

/// Bound on the token-endpoint round trip
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OAuth2 client for Pinterest authentication.
///
/// The authorize URL is built through the `oauth2` crate; the code exchange
/// is an explicit POST because Pinterest expects HTTP Basic client
/// authentication with a form body.
pub struct PinterestOAuthClient {
    client: BasicClient,
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl PinterestOAuthClient {
    /// Create a new Pinterest OAuth2 client from configuration.
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let redirect_uri = config.redirect_uri();

        let auth_url = AuthUrl::new(config.pinterest_authorize_url.clone())?;
        let redirect_url = RedirectUrl::new(redirect_uri.clone())?;

        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            None,
        )
        .set_redirect_uri(redirect_url);

        let http = reqwest::Client::builder()
            .user_agent("pinmatch-server/0.1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            http,
            token_url: config.pinterest_token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri,
        })
    }

    /// Generate the authorization URL and the CSRF state token to store
    /// alongside it. The token is 32 random bytes, hex-encoded.
    pub fn authorize_url(&self) -> (String, CsrfToken) {
        let (auth_url, csrf_token) = self
            .client
            .authorize_url(|| CsrfToken::new(generate_state_token()))
            .add_scope(Scope::new(OAUTH_SCOPES.to_string()))
            .url();

        (auth_url.to_string(), csrf_token)
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Single attempt; any non-2xx response or transport failure rejects the
    /// login. Client credentials go in an `Authorization: Basic` header, not
    /// the body.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        let basic = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .http
            .post(&self.token_url)
            .header(header::AUTHORIZATION, format!("Basic {}", basic))
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Token exchange rejected by provider");
            return Err(AuthError::TokenExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    }
}

/// Generate a random CSRF state token: 32 bytes, hex-encoded (64 chars).
fn generate_state_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}
