// Generation forwarding tests against the public API

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use brandgen::compose::{compose_bytes, AssetRoot, Composer, OverlayConfig};
use brandgen::constants::{MSG_API_KEY_UNAVAILABLE, MSG_UPSTREAM_UNAVAILABLE};
use brandgen::metrics::Metrics;
use brandgen::upstream::{
    rewrite_inline_image, GenerateService, Generator, StaticKeyProvider, UpstreamError,
};
use image::{Rgba, RgbaImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Generator returning a canned result and recording what it was sent.
struct CannedGenerator {
    result: Result<Value, UpstreamError>,
    calls: Mutex<Vec<(Value, String)>>,
}

impl CannedGenerator {
    fn new(result: Result<Value, UpstreamError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(Value, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(&self, payload: &Value, api_key: &str) -> Result<Value, UpstreamError> {
        self.calls
            .lock()
            .unwrap()
            .push((payload.clone(), api_key.to_string()));
        self.result.clone()
    }
}

fn png_base64(width: u32, height: u32) -> String {
    let image = RgbaImage::from_pixel(width, height, Rgba([10, 200, 10, 255]));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
    STANDARD.encode(buffer.into_inner())
}

fn service(
    key: StaticKeyProvider,
    generator: Arc<CannedGenerator>,
    assets: &std::path::Path,
) -> GenerateService {
    GenerateService::new(
        Arc::new(Composer::new(OverlayConfig::default(), AssetRoot::new(assets))),
        Arc::new(key),
        generator,
        Arc::new(Metrics::new()),
    )
}

#[tokio::test]
async fn test_api_key_and_payload_are_forwarded() {
    let dir = tempfile::tempdir().unwrap();
    let generator = CannedGenerator::new(Ok(json!({"candidates": []})));
    let service = service(StaticKeyProvider::new("server-key"), generator.clone(), dir.path());

    let payload = json!({"contents": [{"parts": [{"text": "a lighthouse at dusk"}]}]});
    let response = service.handle(Some(payload.clone())).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"candidates": []}));
    assert_eq!(generator.calls(), vec![(payload, "server-key".to_string())]);
}

#[tokio::test]
async fn test_missing_key_never_calls_upstream() {
    let dir = tempfile::tempdir().unwrap();
    let generator = CannedGenerator::new(Ok(json!({})));
    let service = service(StaticKeyProvider::empty(), generator.clone(), dir.path());

    let response = service.handle(Some(json!({"contents": [1]}))).await;

    assert_eq!(response.status, 500);
    assert_eq!(response.body["error"], MSG_API_KEY_UNAVAILABLE);
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn test_upstream_error_body_is_guidance_message() {
    let dir = tempfile::tempdir().unwrap();
    let generator = CannedGenerator::new(Err(UpstreamError::Status {
        status: 400,
        body: "{\"error\": {\"message\": \"safety\"}}".to_string(),
    }));
    let service = service(StaticKeyProvider::new("k"), generator, dir.path());

    let response = service.handle(Some(json!({"contents": [1]}))).await;

    assert_eq!(response.status, 400);
    assert_eq!(response.body["error"]["message"], MSG_UPSTREAM_UNAVAILABLE);
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_invalid_upstream_json_maps_to_502() {
    let dir = tempfile::tempdir().unwrap();
    let generator = CannedGenerator::new(Err(UpstreamError::InvalidResponse(
        "expected value at line 1".to_string(),
    )));
    let service = service(StaticKeyProvider::new("k"), generator, dir.path());

    let response = service.handle(Some(json!({"contents": [1]}))).await;
    assert_eq!(response.status, 502);
}

#[tokio::test]
async fn test_missing_banner_still_returns_png() {
    let dir = tempfile::tempdir().unwrap();
    let generator = CannedGenerator::new(Ok(json!({"candidates": [{"content": {"parts": [
        {"inlineData": {"mimeType": "image/png", "data": png_base64(16, 12)}}
    ]}}]})));
    let service = service(StaticKeyProvider::new("k"), generator, dir.path());

    let response = service.handle(Some(json!({"contents": [1]}))).await;
    assert_eq!(response.status, 200);

    let data = response.body["candidates"][0]["content"]["parts"][0]["inlineData"]["data"]
        .as_str()
        .unwrap();
    let decoded = image::load_from_memory(&STANDARD.decode(data).unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 12));

    let snapshot = service.metrics().snapshot();
    assert_eq!(snapshot.step_outcomes.get("banner:skipped"), Some(&1));
}

#[test]
fn test_rewrite_with_engine_outside_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let assets = AssetRoot::new(dir.path());
    let mut response = json!({"candidates": [{"content": {"parts": [
        {"inlineData": {"mimeType": "image/jpeg", "data": png_base64(8, 8)}}
    ]}}]});

    let summary = rewrite_inline_image(&mut response, |bytes| {
        compose_bytes(bytes, &OverlayConfig::default(), &assets)
    })
    .unwrap();

    assert_eq!(summary.part_index, 0);
    assert_eq!(summary.original_mime_type.as_deref(), Some("image/jpeg"));
    assert_eq!(
        response["candidates"][0]["content"]["parts"][0]["inlineData"]["mimeType"],
        "image/png"
    );
}

#[test]
fn test_static_provider_blocking() {
    use brandgen::upstream::ApiKeyProvider;

    let key = tokio_test::block_on(StaticKeyProvider::new(" padded ").api_key());
    assert_eq!(key, Some("padded".to_string()));
}
