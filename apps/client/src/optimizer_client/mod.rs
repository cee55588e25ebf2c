//! Optimizer Client: the single point of entry for calls to the optimization service.
//!
//! ARCHITECTURAL RULE: the session controller never talks HTTP directly.
//! Every outbound `/api/optimize` call goes through the `Optimizer` seam.
//!
//! No retries: a failed call is reported once and the user decides what to do next.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OPTIMIZE_PATH: &str = "/api/optimize";

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Optimization service returned status {status}")]
    Status { status: u16 },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response carried no optimized_text")]
    MissingResult,
}

/// Request body sent to the optimization service.
/// Both fields are always present; `job_description` may be an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub cv_text: String,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
struct OptimizeResponse {
    #[serde(default)]
    optimized_text: Option<String>,
}

impl OptimizeResponse {
    /// Returns the optimized text only when it is present and non-empty.
    fn into_text(self) -> Option<String> {
        self.optimized_text.filter(|text| !text.is_empty())
    }
}

/// The optimization backend as seen by the session controller.
///
/// Carried in the controller as `Arc<dyn Optimizer>` so tests can swap in fakes.
#[async_trait]
pub trait Optimizer: Send + Sync {
    async fn optimize(&self, request: &OptimizeRequest) -> Result<String, OptimizeError>;
}

/// reqwest-backed optimizer talking to `{base_url}/api/optimize`.
#[derive(Clone)]
pub struct HttpOptimizer {
    client: Client,
    endpoint: String,
}

impl HttpOptimizer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, OptimizeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint_url(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Optimizer for HttpOptimizer {
    async fn optimize(&self, request: &OptimizeRequest) -> Result<String, OptimizeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OptimizeError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: OptimizeResponse = serde_json::from_str(&body)?;

        debug!("Optimization call succeeded: {} bytes", body.len());

        parsed.into_text().ok_or(OptimizeError::MissingResult)
    }
}

/// Joins the configured base URL and the optimize path, tolerating trailing slashes.
fn endpoint_url(base_url: &str) -> String {
    format!("{}{OPTIMIZE_PATH}", base_url.trim_end_matches('/'))
}
