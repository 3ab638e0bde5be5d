use axum::{
    body::Body,
    http::{
        header::{COOKIE, LOCATION, SET_COOKIE},
        Request, StatusCode,
    },
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use pinmatch_server::{create_app, AppState, Config};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(token_url: &str) -> Config {
    Config {
        client_id: "test-client-id".to_string(),
        client_secret: "test-client-secret".to_string(),
        base_url: "http://localhost:3000".to_string(),
        pinterest_api_url: "https://api.pinterest.com/v5".to_string(),
        pinterest_authorize_url: "https://www.pinterest.com/oauth/".to_string(),
        pinterest_token_url: token_url.to_string(),
        analysis_api_url: "http://localhost:8000".to_string(),
        port: 3000,
        cookie_secure: false,
    }
}

fn test_app(config: Config) -> Router {
    let state = AppState::from_config(Arc::new(config)).unwrap();
    create_app(state)
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Login must store the state token in a short-lived HttpOnly cookie and
/// redirect to the provider with the same token in the query string.
#[tokio::test]
async fn test_login_sets_state_cookie_matching_redirect() {
    let app = test_app(test_config("https://api.pinterest.com/v5/oauth/token"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/pinterest")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    let state_cookie = cookie::Cookie::parse(cookies[0].clone()).unwrap();
    assert_eq!(state_cookie.name(), "pinterest_state");
    assert!(state_cookie.http_only().unwrap());
    assert_eq!(state_cookie.same_site(), Some(cookie::SameSite::Lax));
    assert_eq!(
        state_cookie.max_age(),
        Some(cookie::time::Duration::seconds(600))
    );

    let auth_url = url::Url::parse(&location(&response)).unwrap();
    assert!(auth_url.as_str().starts_with("https://www.pinterest.com/oauth/"));

    let params: std::collections::HashMap<_, _> = auth_url.query_pairs().collect();
    assert_eq!(params["client_id"], "test-client-id");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["scope"], "boards:read,pins:read");
    assert_eq!(
        params["redirect_uri"],
        "http://localhost:3000/api/auth/callback/pinterest"
    );
    assert_eq!(params["state"], state_cookie.value());
    assert_eq!(state_cookie.value().len(), 64);
}

/// Full happy path: valid state and code, provider issues a token, session
/// cookie is set and the state cookie is deleted.
#[tokio::test]
async fn test_callback_success_establishes_session() {
    let provider = MockServer::start().await;
    let basic = STANDARD.encode("test-client-id:test-client-secret");

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("authorization", format!("Basic {}", basic).as_str()))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=test-auth-code"))
        .and(body_string_contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fapi%2Fauth%2Fcallback%2Fpinterest",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "abc"})),
        )
        .expect(1)
        .mount(&provider)
        .await;

    let app = test_app(test_config(&format!("{}/oauth/token", provider.uri())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/callback/pinterest?code=test-auth-code&state=valid-state-token")
                .header(COOKIE, "pinterest_state=valid-state-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/user-boards");

    let cookies = set_cookies(&response);
    let token_cookie = cookies
        .iter()
        .find(|c| c.starts_with("pinterest_token="))
        .expect("session cookie not set");
    let token_cookie = cookie::Cookie::parse(token_cookie.clone()).unwrap();
    assert_eq!(token_cookie.value(), "abc");
    assert!(token_cookie.http_only().unwrap());
    assert_eq!(
        token_cookie.max_age(),
        Some(cookie::time::Duration::seconds(86400))
    );

    let cleared_state = cookies
        .iter()
        .find(|c| c.starts_with("pinterest_state="))
        .expect("state cookie not cleared");
    let cleared_state = cookie::Cookie::parse(cleared_state.clone()).unwrap();
    assert_eq!(cleared_state.value(), "");
    assert_eq!(
        cleared_state.max_age(),
        Some(cookie::time::Duration::seconds(0))
    );
}

/// A state that does not match the stored cookie is a CSRF failure: redirect
/// to the error page, no session cookie, and no token exchange attempted.
#[tokio::test]
async fn test_callback_rejects_state_mismatch_without_exchange() {
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;

    let app = test_app(test_config(&format!("{}/oauth/token", provider.uri())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/callback/pinterest?code=test-auth-code&state=attacker-state")
                .header(COOKIE, "pinterest_state=valid-state-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/error");
    assert!(set_cookies(&response)
        .iter()
        .all(|c| !c.starts_with("pinterest_token=")));
}

/// An absent state cookie also fails CSRF verification.
#[tokio::test]
async fn test_callback_rejects_absent_state_cookie() {
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;

    let app = test_app(test_config(&format!("{}/oauth/token", provider.uri())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/callback/pinterest?code=test-auth-code&state=valid-state-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/error");
    assert!(set_cookies(&response)
        .iter()
        .all(|c| !c.starts_with("pinterest_token=")));
}

/// Valid state but no authorization code: rejected before any outbound call.
#[tokio::test]
async fn test_callback_rejects_missing_code_without_exchange() {
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;

    let app = test_app(test_config(&format!("{}/oauth/token", provider.uri())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/callback/pinterest?state=valid-state-token")
                .header(COOKIE, "pinterest_state=valid-state-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/error");
    assert!(set_cookies(&response)
        .iter()
        .all(|c| !c.starts_with("pinterest_token=")));
}

/// Provider rejecting the code (non-2xx) must not establish a session.
#[tokio::test]
async fn test_callback_token_exchange_failure_sets_no_session() {
    let provider = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": "invalid_grant"})),
        )
        .expect(1)
        .mount(&provider)
        .await;

    let app = test_app(test_config(&format!("{}/oauth/token", provider.uri())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/callback/pinterest?code=expired-code&state=valid-state-token")
                .header(COOKIE, "pinterest_state=valid-state-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "http://localhost:3000/error");
    assert!(set_cookies(&response).is_empty());
}
