// Configuration module unit tests

use brandgen::compose::{CaptionStyle, FontSizePolicy, OverlayConfig};
use brandgen::config::*;
use rstest::rstest;
use std::io::Write;
use std::path::PathBuf;

const FULL_CONFIG: &str = r##"
assets:
  root: /srv/brandgen/assets
overlay:
  variant: banner-caption
  banner: { path: bottom_banner.png }
  caption:
    text: "Made Possible By Google"
    font_path: fonts/brand.ttf
    font_size: { mode: fixed, size: 28.0 }
    margin: 15
    stroke_width: 2
upstream:
  base_url: https://generativelanguage.googleapis.com
  model: gemini-3-pro-image-preview
  timeout_secs: 120
secret:
  source: file
  name: /run/secrets/gemini-api-key
logging:
  level: debug
  json: true
"##;

#[test]
fn test_can_deserialize_full_config() {
    let config = Config::from_yaml_with_env(FULL_CONFIG).expect("Failed to parse config");

    assert_eq!(config.assets.root, PathBuf::from("/srv/brandgen/assets"));
    assert_eq!(config.overlay.variant_name(), "banner-caption");
    match config.overlay.caption() {
        Some(CaptionStyle::Stroked(caption)) => {
            assert_eq!(caption.font_path, Some(PathBuf::from("fonts/brand.ttf")));
            assert_eq!(caption.font_size, FontSizePolicy::Fixed { size: 28.0 });
            assert_eq!(caption.margin, 15);
        }
        other => panic!("Expected stroked caption, got {:?}", other),
    }
    assert_eq!(config.upstream.timeout_secs, 120);
    assert_eq!(config.secret.source, SecretSource::File);
    assert_eq!(config.secret.name, "/run/secrets/gemini-api-key");
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_can_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL_CONFIG.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).expect("Failed to load config file");
    assert_eq!(config.upstream.model, "gemini-3-pro-image-preview");
}

#[test]
fn test_missing_config_file_reports_error() {
    let err = Config::from_file("/nonexistent/brandgen.yaml").unwrap_err();
    assert!(err.contains("Failed to read config file"));
}

#[test]
fn test_env_var_substitution_in_secret_name() {
    std::env::set_var("BRANDGEN_UNIT_KEY_VAR", "HK_MINISITE_KEY");
    let yaml = "secret:\n  source: env\n  name: ${BRANDGEN_UNIT_KEY_VAR}\n";

    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.secret.name, "HK_MINISITE_KEY");
}

#[test]
fn test_overlay_defaults_to_banner_only() {
    let config = Config::from_yaml_with_env("upstream:\n  timeout_secs: 30\n").unwrap();
    assert_eq!(config.overlay, OverlayConfig::default());
    assert_eq!(config.upstream.timeout_secs, 30);
    assert_eq!(config.upstream.model, "gemini-3-pro-image-preview");
}

#[test]
fn test_caption_box_logo_config() {
    let yaml = r##"
overlay:
  variant: caption-box-logo
  caption_box:
    text: "Generated with AI\nHong Kong"
  logo:
    path: brand/logo.png
"##;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert!(config.validate().is_ok());

    let logo = config.overlay.logo().unwrap();
    assert_eq!(logo.path, PathBuf::from("brand/logo.png"));
    assert_eq!(logo.width_fraction, 0.15);
    assert_eq!(
        config.overlay.caption().unwrap().font_size().resolve(2000),
        50.0
    );
}

#[rstest]
#[case::empty_caption("overlay:\n  variant: banner-caption\n  caption:\n    text: \"\"\n", "empty")]
#[case::zero_font_size(
    "overlay:\n  variant: banner-caption\n  caption:\n    font_size: { mode: fixed, size: 0.0 }\n",
    "font size"
)]
#[case::huge_font_size(
    "overlay:\n  variant: banner-caption\n  caption:\n    font_size: { mode: fixed, size: 100000.0 }\n",
    "font size"
)]
#[case::huge_stroke_width(
    "overlay:\n  variant: banner-caption\n  caption:\n    stroke_width: 10000\n",
    "stroke_width"
)]
#[case::logo_fraction_too_large(
    "overlay:\n  variant: caption-box-logo\n  caption_box:\n    text: hi\n  logo:\n    width_fraction: 1.5\n",
    "width_fraction"
)]
#[case::bad_color(
    "overlay:\n  variant: banner-caption\n  caption:\n    color: white\n",
    "hex"
)]
#[case::empty_banner_path("overlay:\n  variant: banner-only\n  banner:\n    path: \"\"\n", "banner path")]
#[case::bad_base_url("upstream:\n  base_url: generativelanguage.googleapis.com\n", "http")]
#[case::empty_model("upstream:\n  model: \"\"\n", "model")]
#[case::zero_timeout("upstream:\n  timeout_secs: 0\n", "timeout_secs")]
#[case::empty_secret_name("secret:\n  name: \"\"\n", "Secret name")]
#[case::empty_log_level("logging:\n  level: \"\"\n", "Logging level")]
fn test_validation_rejects(#[case] yaml: &str, #[case] expected: &str) {
    let config = Config::from_yaml_with_env(yaml).expect("YAML should parse");
    let err = config.validate().unwrap_err();
    assert!(
        err.contains(expected),
        "expected error containing '{}', got '{}'",
        expected,
        err
    );
}

#[rstest]
#[case("source: env", SecretSource::Env)]
#[case("source: file", SecretSource::File)]
fn test_secret_source_parsing(#[case] line: &str, #[case] expected: SecretSource) {
    let yaml = format!("secret:\n  {}\n", line);
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    assert_eq!(config.secret.source, expected);
}

#[test]
fn test_unknown_secret_source_rejected() {
    let result = Config::from_yaml_with_env("secret:\n  source: vault\n");
    assert!(result.is_err());
}
