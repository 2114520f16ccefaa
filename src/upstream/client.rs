//! HTTP client for the generation API.

use crate::config::UpstreamConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors from a generation call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UpstreamError {
    /// The API answered with a non-success status.
    #[error("Generation API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// No usable HTTP response (connect failure, timeout, ...).
    #[error("Generation API request failed: {0}")]
    Transport(String),

    /// The API answered 2xx but the body is not JSON.
    #[error("Generation API returned an invalid response: {0}")]
    InvalidResponse(String),

    /// The client could not be constructed.
    #[error("Generation client configuration error: {0}")]
    Config(String),
}

impl UpstreamError {
    /// Upstream HTTP status, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Something that turns a generation payload into a generation response.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, payload: &Value, api_key: &str) -> Result<Value, UpstreamError>;
}

/// `generateContent` client over reqwest.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    base_url: String,
    model: String,
    timeout: Duration,
    client: Client,
}

impl GenerationClient {
    /// # Errors
    ///
    /// Returns `UpstreamError::Config` if the HTTP client cannot be built.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Request URL including the key. Do not log it.
    pub fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        )
    }
}

#[async_trait]
impl Generator for GenerationClient {
    async fn generate(&self, payload: &Value, api_key: &str) -> Result<Value, UpstreamError> {
        tracing::debug!(model = %self.model, "Forwarding generation request");

        let response = self
            .client
            .post(self.endpoint(api_key))
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors can embed the URL, which carries the key
                let e = e.without_url();
                if e.is_timeout() {
                    UpstreamError::Transport(format!("Request timed out: {}", e))
                } else if e.is_connect() {
                    UpstreamError::Transport(format!("Failed to connect: {}", e))
                } else {
                    UpstreamError::Transport(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(e.without_url().to_string()))
    }
}
