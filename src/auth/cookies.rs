use axum::http::{header, HeaderMap};
use cookie::{Cookie, SameSite};

/// Cookie holding the CSRF state token during the authorization flow
pub const STATE_COOKIE_NAME: &str = "pinterest_state";

/// Cookie holding the Pinterest access token for the browser session
pub const TOKEN_COOKIE_NAME: &str = "pinterest_token";

/// State cookie max age (10 minutes, the authorization flow window)
const STATE_COOKIE_MAX_AGE: i64 = 600;

/// Token cookie max age (24 hours; no refresh, expiry forces re-login)
const TOKEN_COOKIE_MAX_AGE: i64 = 60 * 60 * 24;

/// Session cookie values read from one request.
///
/// Handlers receive this as an explicit value instead of reaching into
/// ambient request state, so the auth logic stays testable with injected
/// cookie maps.
#[derive(Debug, Clone, Default)]
pub struct SessionCookies {
    /// CSRF state token stored at login initiation, if present
    pub state: Option<String>,

    /// Pinterest access token, if the session is established
    pub token: Option<String>,
}

impl SessionCookies {
    /// Parse the session cookies out of a request's headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            state: extract_cookie(headers, STATE_COOKIE_NAME),
            token: extract_cookie(headers, TOKEN_COOKIE_NAME),
        }
    }

    /// Verify a state value echoed back by the provider against the stored
    /// cookie. Absent cookie or any mismatch fails.
    pub fn matches_state(&self, returned: &str) -> bool {
        self.state.as_deref() == Some(returned)
    }
}

/// Build the CSRF state cookie set before redirecting to Pinterest.
pub fn state_cookie(token: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(STATE_COOKIE_NAME, token.to_string());
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(cookie::time::Duration::seconds(STATE_COOKIE_MAX_AGE));
    cookie
}

/// Build the session cookie carrying the Pinterest access token.
pub fn token_cookie(access_token: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(TOKEN_COOKIE_NAME, access_token.to_string());
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(cookie::time::Duration::seconds(TOKEN_COOKIE_MAX_AGE));
    cookie
}

/// Deletion cookie for the CSRF state (expires immediately). The state is
/// single-use: it is cleared as soon as an exchange succeeds.
pub fn clear_state_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(STATE_COOKIE_NAME, "");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(cookie::time::Duration::seconds(0));
    cookie
}

/// Extract a cookie value from request headers.
fn extract_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            if name == cookie_name {
                Some(value.to_string())
            } else {
                None
            }
        })
}
