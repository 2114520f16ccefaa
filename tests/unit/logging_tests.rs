// Logging tests
//
// The global subscriber can only be installed once per process, so the
// initialization itself is exercised in a single test.

use brandgen::config::LoggingConfig;
use brandgen::logging::{build_filter, init_subscriber};

#[test]
fn test_build_filter_accepts_level_directives() {
    std::env::remove_var("RUST_LOG");

    for level in ["info", "debug", "brandgen=trace,reqwest=warn"] {
        let config = LoggingConfig {
            level: level.to_string(),
            json: false,
        };
        assert!(build_filter(&config).is_ok(), "level '{}' should parse", level);
    }
}

#[test]
fn test_build_filter_rejects_garbage() {
    std::env::remove_var("RUST_LOG");

    let config = LoggingConfig {
        level: "brandgen=notalevel".to_string(),
        json: false,
    };
    assert!(build_filter(&config).is_err());
}

#[test]
fn test_init_subscriber_only_once() {
    let config = LoggingConfig {
        level: "info".to_string(),
        json: true,
    };

    assert!(init_subscriber(&config).is_ok());
    tracing::info!(component = "logging_tests", "subscriber installed");

    // A second global subscriber is refused
    assert!(init_subscriber(&config).is_err());
}
