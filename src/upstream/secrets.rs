//! API key providers.
//!
//! The generation API key is read fresh on every request so that a rotated
//! secret is picked up without a restart.

use crate::config::{SecretConfig, SecretSource};
use crate::error::BrandError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Source of the generation API key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyProvider: Send + Sync {
    /// The current key, or `None` when it cannot be obtained.
    async fn api_key(&self) -> Option<String>;

    /// Human-readable description for logs (never the key itself).
    fn describe(&self) -> String;
}

/// Key read from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvKeyProvider {
    var: String,
}

impl EnvKeyProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl ApiKeyProvider for EnvKeyProvider {
    async fn api_key(&self) -> Option<String> {
        match std::env::var(&self.var) {
            Ok(value) => non_empty(value),
            Err(_) => {
                tracing::error!(variable = %self.var, "API key environment variable not set");
                None
            }
        }
    }

    fn describe(&self) -> String {
        format!("env:{}", self.var)
    }
}

/// Key read from a file, e.g. a secret volume mount.
#[derive(Debug, Clone)]
pub struct FileKeyProvider {
    path: PathBuf,
}

impl FileKeyProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ApiKeyProvider for FileKeyProvider {
    async fn api_key(&self) -> Option<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => non_empty(contents),
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read API key file"
                );
                None
            }
        }
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Fixed key, for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyProvider {
    key: Option<String>,
}

impl StaticKeyProvider {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    /// Provider that never yields a key.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyProvider for StaticKeyProvider {
    async fn api_key(&self) -> Option<String> {
        self.key.clone().and_then(non_empty)
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Build the provider selected in configuration.
pub fn from_config(config: &SecretConfig) -> Arc<dyn ApiKeyProvider> {
    match config.source {
        SecretSource::Env => Arc::new(EnvKeyProvider::new(&config.name)),
        SecretSource::File => Arc::new(FileKeyProvider::new(&config.name)),
    }
}

/// Resolve the key now, failing when the provider has none.
pub async fn require_api_key(provider: &dyn ApiKeyProvider) -> Result<String, BrandError> {
    provider.api_key().await.ok_or_else(|| {
        BrandError::Secret(format!("No API key available from {}", provider.describe()))
    })
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
