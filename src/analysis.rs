use serde_json::{json, Value};
use std::time::Duration;
use tracing::error;

/// Bound on the analysis-service round trip
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error types for the image-analysis proxy
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Analysis service returned status {status}")]
    Upstream { status: u16 },
}

/// Client for the external image-analysis service. Pure pass-through: one
/// attempt, no caching, the match payload is relayed opaquely.
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    /// Create a new analysis client against the given service base URL.
    pub fn new(base_url: String) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .user_agent("pinmatch-server/0.1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Submit one image URL for similarity matching and return the raw match
    /// result.
    pub async fn process_image(&self, image_url: &str) -> Result<Value, AnalysisError> {
        let url = format!("{}/process-image", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&json!({ "image_url": image_url }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Analysis service rejected image");
            return Err(AnalysisError::Upstream {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}
