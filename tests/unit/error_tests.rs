// Error handling tests

use brandgen::compose::ComposeError;
use brandgen::error::BrandError;
use brandgen::upstream::UpstreamError;

#[test]
fn test_brand_error_display() {
    assert_eq!(
        BrandError::Config("invalid YAML syntax".to_string()).to_string(),
        "Configuration error: invalid YAML syntax"
    );
    assert_eq!(
        BrandError::Secret("key file missing".to_string()).to_string(),
        "Secret error: key file missing"
    );
    assert_eq!(
        BrandError::Upstream("connection refused".to_string()).to_string(),
        "Upstream error: connection refused"
    );
    assert_eq!(
        BrandError::Internal("worker panicked".to_string()).to_string(),
        "Internal error: worker panicked"
    );
}

#[test]
fn test_brand_error_status_codes() {
    assert_eq!(BrandError::Config("x".to_string()).status_code(), 500);
    assert_eq!(BrandError::Secret("x".to_string()).status_code(), 500);
    assert_eq!(BrandError::Internal("x".to_string()).status_code(), 500);
    assert_eq!(BrandError::Upstream("x".to_string()).status_code(), 502);
}

#[test]
fn test_brand_error_is_std_error() {
    fn takes_error(_: &(dyn std::error::Error + Send + Sync)) {}
    takes_error(&BrandError::Config("x".to_string()));

    let wrapped: anyhow::Error = BrandError::Secret("no key".to_string()).into();
    assert_eq!(wrapped.to_string(), "Secret error: no key");
}

#[test]
fn test_upstream_error_converts_to_brand_error() {
    let err: BrandError = UpstreamError::Status {
        status: 503,
        body: "overloaded".to_string(),
    }
    .into();

    match err {
        BrandError::Upstream(msg) => {
            assert!(msg.contains("503"));
            assert!(msg.contains("overloaded"));
        }
        other => panic!("Expected Upstream variant, got {:?}", other),
    }
}

#[test]
fn test_compose_error_kinds() {
    let cases = [
        (ComposeError::asset_missing("logo.png", "gone"), "asset_missing"),
        (
            ComposeError::font_unavailable("brand.ttf", "gone"),
            "font_unavailable",
        ),
        (ComposeError::DecodeFailure("x".to_string()), "decode_failure"),
        (ComposeError::Render("x".to_string()), "render"),
        (ComposeError::Encode("x".to_string()), "encode"),
    ];
    for (err, kind) in cases {
        assert_eq!(err.kind(), kind);
    }
}
