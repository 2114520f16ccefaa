//! Generation forwarding.
//!
//! Attaches the server-held API key to a caller's generation payload,
//! forwards it to the generation API and brands the first returned image
//! before handing the JSON back.
//!
//! | Situation                  | Status              | Body                                   |
//! |----------------------------|---------------------|----------------------------------------|
//! | API key unavailable        | 500                 | `{"error": "<message>"}`               |
//! | Missing or empty payload   | 400                 | `{"error": "<message>"}`               |
//! | Upstream call failed       | upstream status/502 | `{"error": {"message": "<html>"}}`     |
//! | Success                    | 200                 | upstream JSON, first image rewritten   |

pub mod client;
pub mod response;
pub mod secrets;

pub use client::{GenerationClient, Generator, UpstreamError};
pub use response::{
    extract_inline_image, replace_inline_image, rewrite_inline_image, InlineImage, RewriteSummary,
};
pub use secrets::{ApiKeyProvider, EnvKeyProvider, FileKeyProvider, StaticKeyProvider};

use crate::compose::{ComposeReport, Composer};
use crate::constants::*;
use crate::error::BrandError;
use crate::metrics::Metrics;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

/// Status and JSON body to return to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub status: u16,
    pub body: Value,
}

impl GenerateResponse {
    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    fn upstream_failure(status: u16) -> Self {
        Self {
            status,
            body: json!({ "error": { "message": MSG_UPSTREAM_UNAVAILABLE } }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request handler for the generate endpoint.
#[derive(Clone)]
pub struct GenerateService {
    composer: Arc<Composer>,
    key_provider: Arc<dyn ApiKeyProvider>,
    generator: Arc<dyn Generator>,
    metrics: Arc<Metrics>,
}

impl GenerateService {
    pub fn new(
        composer: Arc<Composer>,
        key_provider: Arc<dyn ApiKeyProvider>,
        generator: Arc<dyn Generator>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            composer,
            key_provider,
            generator,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Handle one generate request. Never fails; errors become responses.
    pub async fn handle(&self, payload: Option<Value>) -> GenerateResponse {
        let response = self.forward(payload).await;
        self.metrics.record_upstream(response.status);
        response
    }

    async fn forward(&self, payload: Option<Value>) -> GenerateResponse {
        let api_key = match self.key_provider.api_key().await {
            Some(key) => key,
            None => {
                tracing::error!(
                    source = %self.key_provider.describe(),
                    "API key unavailable, refusing request"
                );
                return GenerateResponse::error(500, MSG_API_KEY_UNAVAILABLE);
            }
        };

        let payload = match payload {
            Some(payload) if !is_empty_payload(&payload) => payload,
            _ => {
                tracing::warn!("Rejected generate request with empty payload");
                return GenerateResponse::error(400, MSG_INVALID_PAYLOAD);
            }
        };

        let body = match self.generator.generate(&payload, &api_key).await {
            Ok(body) => body,
            Err(err) => {
                let status = err.status().unwrap_or(UPSTREAM_FAILURE_STATUS);
                tracing::error!(status, error = %err, "Generation API call failed");
                return GenerateResponse::upstream_failure(status);
            }
        };

        match self.brand_first_image(body).await {
            Ok((body, rewritten)) => {
                if rewritten {
                    self.metrics.increment_images_rewritten();
                } else {
                    tracing::debug!("Generation response carried no inline image");
                }
                GenerateResponse { status: 200, body }
            }
            Err(err) => {
                tracing::error!(error = %err, "Image composition task failed");
                GenerateResponse::error(err.status_code(), MSG_INTERNAL_ERROR)
            }
        }
    }

    /// Compose onto the first inline image, off the async runtime.
    ///
    /// Hands back the body along with whether an image was rewritten.
    async fn brand_first_image(&self, body: Value) -> Result<(Value, bool), BrandError> {
        let composer = Arc::clone(&self.composer);
        let started = Instant::now();

        let (body, rewrite) = tokio::task::spawn_blocking(move || {
            let mut body = body;
            let mut report: Option<ComposeReport> = None;
            let summary = rewrite_inline_image(&mut body, |bytes| {
                let composition = composer.compose(bytes);
                report = Some(composition.report);
                composition.bytes
            });
            (body, summary.zip(report))
        })
        .await
        .map_err(|e| BrandError::Internal(format!("Composition task panicked: {}", e)))?;

        let (summary, report) = match rewrite {
            Some(rewrite) => rewrite,
            None => return Ok((body, false)),
        };

        self.metrics
            .record_compose_duration(started.elapsed().as_secs_f64() * 1000.0);
        self.metrics.record_composition(&report);

        tracing::info!(
            part_index = summary.part_index,
            original_mime_type = summary.original_mime_type.as_deref().unwrap_or("unknown"),
            input_bytes = summary.input_bytes,
            output_bytes = summary.output_bytes,
            banner = report.banner.label(),
            caption = report.caption.label(),
            logo = report.logo.label(),
            passthrough = report.is_passthrough(),
            "Branded generated image"
        );

        Ok((body, true))
    }
}

/// Falsy JSON (`null`, `{}`, `[]`, `""`, `false`, `0`) counts as no payload.
fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}
