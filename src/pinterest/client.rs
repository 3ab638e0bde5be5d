use crate::pinterest::types::{Board, BoardWithPins, BoardsResponse, PinsResponse};
use futures::stream::{self, StreamExt};
use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

/// Boards fetched per page on the aggregate view
const BOARDS_PAGE_SIZE: usize = 25;

/// Pins fetched per board during the fan-out
const FANOUT_PINS_PAGE_SIZE: usize = 10;

/// Pins fetched for the single-board detail view
const DETAIL_PINS_PAGE_SIZE: usize = 25;

/// Cap on concurrent pin fetches during the fan-out
const MAX_CONCURRENT_PIN_FETCHES: usize = 8;

/// Bound on each Pinterest API round trip
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error types for Pinterest API operations
#[derive(Debug, thiserror::Error)]
pub enum PinterestError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unauthorized - token missing or expired")]
    Unauthorized,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Pinterest REST API client. Stateless: the bearer token comes from the
/// caller's session cookie on every call.
pub struct PinterestClient {
    http: reqwest::Client,
    api_base: String,
}

impl PinterestClient {
    /// Create a new Pinterest API client against the given API base URL.
    pub fn new(api_base: String) -> Result<Self, PinterestError> {
        let http = reqwest::Client::builder()
            .user_agent("pinmatch-server/0.1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, api_base })
    }

    /// List the authenticated user's boards.
    pub async fn list_boards(&self, access_token: &str) -> Result<BoardsResponse, PinterestError> {
        let path = format!("/boards?page_size={}&include_empty=true", BOARDS_PAGE_SIZE);
        self.get_json(&path, access_token).await
    }

    /// List pins for one board, sized for the detail view.
    pub async fn board_pins(
        &self,
        access_token: &str,
        board_id: &str,
    ) -> Result<PinsResponse, PinterestError> {
        self.list_board_pins(access_token, board_id, DETAIL_PINS_PAGE_SIZE)
            .await
    }

    /// List the user's boards and merge each with its pins.
    ///
    /// Pin fetches run concurrently, at most `MAX_CONCURRENT_PIN_FETCHES` in
    /// flight, preserving board order. A failed pin fetch degrades that one
    /// board to an empty pin list; only the board listing itself can fail the
    /// aggregate.
    pub async fn boards_with_pins(
        &self,
        access_token: &str,
    ) -> Result<Vec<BoardWithPins>, PinterestError> {
        let boards = self.list_boards(access_token).await?;

        let merged = stream::iter(boards.items)
            .map(|board| self.merge_board_pins(access_token, board))
            .buffered(MAX_CONCURRENT_PIN_FETCHES)
            .collect()
            .await;

        Ok(merged)
    }

    async fn merge_board_pins(&self, access_token: &str, board: Board) -> BoardWithPins {
        let pins = match self
            .list_board_pins(access_token, &board.id, FANOUT_PINS_PAGE_SIZE)
            .await
        {
            Ok(response) => response.items,
            Err(err) => {
                warn!(board_id = %board.id, error = %err, "Failed to fetch pins for board");
                Vec::new()
            }
        };

        BoardWithPins { board, pins }
    }

    async fn list_board_pins(
        &self,
        access_token: &str,
        board_id: &str,
        page_size: usize,
    ) -> Result<PinsResponse, PinterestError> {
        let path = format!("/boards/{}/pins?page_size={}", board_id, page_size);
        self.get_json(&path, access_token).await
    }

    /// Make an authenticated GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
    ) -> Result<T, PinterestError> {
        let url = format!("{}{}", self.api_base, path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(PinterestError::Unauthorized),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                Err(PinterestError::Api {
                    status: status.as_u16(),
                    message: extract_error_message(&body),
                })
            }
        }
    }
}

/// Pull the `message` field out of a Pinterest error body, falling back to
/// the raw body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
