// Error types module

use std::fmt;

/// Centralized error type for the service
///
/// Composition never fails as a whole (see `compose::ComposeReport`), so
/// these cover everything around it: configuration, the API key, the
/// upstream call and unexpected internal failures.
#[derive(Debug, Clone, PartialEq)]
pub enum BrandError {
    /// Configuration errors (invalid YAML, missing env vars, failed validation)
    Config(String),

    /// API key could not be obtained
    Secret(String),

    /// Generation API errors (non-2xx response, timeout, connection refused)
    Upstream(String),

    /// Internal errors (worker panics, unexpected I/O failures)
    Internal(String),
}

impl BrandError {
    /// HTTP status a caller should see for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            BrandError::Config(_) | BrandError::Secret(_) | BrandError::Internal(_) => 500,
            BrandError::Upstream(_) => 502,
        }
    }
}

impl fmt::Display for BrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrandError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BrandError::Secret(msg) => write!(f, "Secret error: {}", msg),
            BrandError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            BrandError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for BrandError {}

impl From<crate::upstream::UpstreamError> for BrandError {
    fn from(err: crate::upstream::UpstreamError) -> Self {
        BrandError::Upstream(err.to_string())
    }
}
