pub mod analysis;
pub mod auth;
pub mod config;
pub mod http_server;
pub mod pinterest;

pub use analysis::{AnalysisClient, AnalysisError};
pub use auth::{AuthError, PinterestOAuthClient, SessionCookies, TokenResponse};
pub use config::{Config, ConfigError};
pub use http_server::{create_app, run_server, AppState, ServerError};
pub use pinterest::{PinterestClient, PinterestError};
