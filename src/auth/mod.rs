pub mod cookies;
pub mod oauth;
pub mod types;

pub use cookies::{
    clear_state_cookie, state_cookie, token_cookie, SessionCookies, STATE_COOKIE_NAME,
    TOKEN_COOKIE_NAME,
};
pub use oauth::PinterestOAuthClient;
pub use types::{AuthError, TokenResponse};
