use crate::analysis::{AnalysisClient, AnalysisError};
use crate::auth::{
    clear_state_cookie, state_cookie, token_cookie, AuthError, PinterestOAuthClient,
    SessionCookies, TokenResponse,
};
use crate::config::Config;
use crate::pinterest::{BoardWithPins, PinterestClient, PinterestError, PinsResponse};
use axum::{
    extract::{Path, Query, State},
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{AppendHeaders, Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// OAuth callback query parameters. Both are optional so the handler can
/// reject malformed callbacks itself instead of letting extraction fail.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzePinRequest {
    #[serde(rename = "imageUrl", default)]
    image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BoardsWithPinsResponse {
    items: Vec<BoardWithPins>,
}

/// Startup failures while wiring the dependency set
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("OAuth client setup failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Pinterest client setup failed: {0}")]
    Pinterest(#[from] PinterestError),

    #[error("Analysis client setup failed: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub oauth: Arc<PinterestOAuthClient>,
    pub pinterest: Arc<PinterestClient>,
    pub analysis: Arc<AnalysisClient>,
}

impl AppState {
    /// Build the full dependency set from configuration.
    pub fn from_config(config: Arc<Config>) -> Result<Self, ServerError> {
        let oauth = Arc::new(PinterestOAuthClient::new(&config)?);
        let pinterest = Arc::new(PinterestClient::new(config.pinterest_api_url.clone())?);
        let analysis = Arc::new(AnalysisClient::new(config.analysis_api_url.clone())?);

        Ok(Self {
            config,
            oauth,
            pinterest,
            analysis,
        })
    }
}

impl From<PinterestError> for ApiError {
    fn from(err: PinterestError) -> Self {
        match err {
            PinterestError::Unauthorized => ApiError::Upstream {
                status: StatusCode::UNAUTHORIZED,
                message: "Pinterest rejected the access token".to_string(),
            },
            PinterestError::Api { status, message } => ApiError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            PinterestError::HttpError(err) => {
                error!(error = %err, "Pinterest API request failed");
                ApiError::Internal("Failed to fetch boards".to_string())
            }
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        error!(error = %err, "Image analysis failed");
        ApiError::Internal("Failed to analyze image".to_string())
    }
}

/// JSON error surface for the proxy endpoints
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    BadRequest(String),
    Upstream { status: StatusCode, message: String },
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Upstream { status, message } => (status, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Handle GET /api/auth/pinterest - start the authorization flow.
///
/// Generates the CSRF state token, stores it in the `pinterest_state` cookie
/// and redirects the browser to Pinterest's authorize endpoint.
async fn login(State(state): State<AppState>) -> Response {
    let (auth_url, csrf_token) = state.oauth.authorize_url();
    let cookie = state_cookie(csrf_token.secret(), state.config.cookie_secure);

    info!("Redirecting to Pinterest authorization endpoint");

    (
        StatusCode::FOUND,
        AppendHeaders([
            (SET_COOKIE, cookie.to_string()),
            (LOCATION, auth_url),
        ]),
    )
        .into_response()
}

/// Handle GET /api/auth/callback/pinterest - complete the authorization flow.
///
/// Verifies the echoed state against the stored cookie, exchanges the code
/// for an access token and establishes the session cookie. Every failure
/// redirects to the error page without setting a session cookie.
async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);

    match handle_callback(&state, &params, &cookies).await {
        Ok(tokens) => {
            let session = token_cookie(&tokens.access_token, state.config.cookie_secure);
            let clear_state = clear_state_cookie(state.config.cookie_secure);

            info!("OAuth session established");

            (
                StatusCode::FOUND,
                AppendHeaders([
                    (SET_COOKIE, session.to_string()),
                    (SET_COOKIE, clear_state.to_string()),
                    (LOCATION, format!("{}/user-boards", state.config.base_url)),
                ]),
            )
                .into_response()
        }
        Err(err) => {
            warn!(error = %err, "OAuth callback rejected");

            (
                StatusCode::FOUND,
                AppendHeaders([(LOCATION, format!("{}/error", state.config.base_url))]),
            )
                .into_response()
        }
    }
}

/// The callback decision ladder: state check, code check, token exchange.
/// No session cookie is issued unless every step succeeds.
async fn handle_callback(
    state: &AppState,
    params: &CallbackParams,
    cookies: &SessionCookies,
) -> Result<TokenResponse, AuthError> {
    let returned_state = params.state.as_deref().ok_or(AuthError::StateMismatch)?;
    if !cookies.matches_state(returned_state) {
        return Err(AuthError::StateMismatch);
    }

    let code = params.code.as_deref().ok_or(AuthError::MissingCode)?;

    state.oauth.exchange_code(code).await
}

/// Handle GET /api/user/boards - boards merged with their pins.
async fn list_boards(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BoardsWithPinsResponse>, ApiError> {
    let cookies = SessionCookies::from_headers(&headers);
    let token = cookies.token.ok_or(ApiError::Unauthenticated)?;

    let items = state.pinterest.boards_with_pins(&token).await?;
    Ok(Json(BoardsWithPinsResponse { items }))
}

/// Handle GET /api/user/boards/{board_id} - pins for one board.
async fn board_pins(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PinsResponse>, ApiError> {
    let cookies = SessionCookies::from_headers(&headers);
    let token = cookies.token.ok_or(ApiError::Unauthenticated)?;

    let pins = state.pinterest.board_pins(&token, &board_id).await?;
    Ok(Json(pins))
}

/// Handle POST /api/analyze-pin - forward one image URL to the analysis
/// service and relay the match result.
async fn analyze_pin(
    State(state): State<AppState>,
    Json(request): Json<AnalyzePinRequest>,
) -> Result<Json<Value>, ApiError> {
    let image_url = request
        .image_url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Image URL is required".to_string()))?;

    let matches = state.analysis.process_image(&image_url).await?;
    Ok(Json(matches))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn index_page() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn error_page() -> Html<&'static str> {
    Html(ERROR_PAGE)
}

async fn boards_page() -> Html<&'static str> {
    Html(BOARDS_PAGE)
}

/// Create and configure the HTTP server
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/error", get(error_page))
        .route("/user-boards", get(boards_page))
        .route("/health", get(health_check))
        .route("/api/auth/pinterest", get(login))
        .route("/api/auth/callback/pinterest", get(oauth_callback))
        .route("/api/user/boards", get(list_boards))
        .route("/api/user/boards/:board_id", get(board_pins))
        .route("/api/analyze-pin", post(analyze_pin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(state: AppState) -> std::io::Result<()> {
    let port = state.config.port;
    let app = create_app(state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Pinterest Match</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
               display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; }
        .container { text-align: center; max-width: 480px; }
        a.connect { display: inline-block; padding: 0.8rem 1.6rem; border-radius: 8px;
                    background: #e60023; color: white; text-decoration: none; }
        p { color: #4a5568; line-height: 1.6; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Pinterest Match</h1>
        <p>Connect your Pinterest account to browse your boards and find similar images.</p>
        <a class="connect" href="/api/auth/pinterest">Connect Pinterest</a>
    </div>
</body>
</html>
"#;

const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Authentication Failed</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
               display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; }
        .container { text-align: center; max-width: 480px; }
        .error { color: #f56565; font-size: 3rem; margin-bottom: 1rem; }
        p { color: #4a5568; line-height: 1.6; }
    </style>
</head>
<body>
    <div class="container">
        <div class="error">&#10007;</div>
        <h1>Authentication Failed</h1>
        <p>We could not connect your Pinterest account. Please <a href="/">try again</a>.</p>
    </div>
</body>
</html>
"#;

const BOARDS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Your Boards</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
               margin: 2rem; color: #2d3748; }
        .board { margin-bottom: 2rem; }
        .pins { display: flex; flex-wrap: wrap; gap: 8px; }
        .pins img { width: 150px; height: 150px; object-fit: cover; border-radius: 8px; cursor: pointer; }
        #status { color: #4a5568; }
    </style>
</head>
<body>
    <h1>Your Boards</h1>
    <p id="status">Loading boards...</p>
    <div id="boards"></div>
    <script>
        async function analyze(url) {
            const res = await fetch('/api/analyze-pin', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ imageUrl: url })
            });
            if (!res.ok) { alert('Analysis failed'); return; }
            const data = await res.json();
            alert('Matches: ' + JSON.stringify(data.matches || {}));
        }

        async function load() {
            const res = await fetch('/api/user/boards');
            if (res.status === 401) { window.location = '/'; return; }
            if (!res.ok) {
                document.getElementById('status').textContent = 'Failed to load boards.';
                return;
            }
            const data = await res.json();
            document.getElementById('status').textContent = '';
            const root = document.getElementById('boards');
            for (const board of data.items || []) {
                const section = document.createElement('div');
                section.className = 'board';
                const title = document.createElement('h2');
                title.textContent = board.name;
                section.appendChild(title);
                const pins = document.createElement('div');
                pins.className = 'pins';
                for (const pin of board.pins || []) {
                    const images = (pin.media && pin.media.images) || {};
                    const img = images['150x150'] || images['400x300'];
                    if (!img) continue;
                    const el = document.createElement('img');
                    el.src = img.url;
                    el.title = pin.title || '';
                    el.onclick = () => analyze(img.url);
                    pins.appendChild(el);
                }
                section.appendChild(pins);
                root.appendChild(section);
            }
        }
        load();
    </script>
</body>
</html>
"#;
