// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::compose::{AssetRoot, Composer, OverlayConfig};
use crate::constants::*;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub secret: SecretConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_asset_root() -> PathBuf {
    PathBuf::from(DEFAULT_ASSET_ROOT)
}

fn default_base_url() -> String {
    DEFAULT_UPSTREAM_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_UPSTREAM_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT_SECS
}

fn default_secret_name() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Where overlay assets (banner, logo, fonts) are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Directory relative asset paths are joined onto (default: ".")
    #[serde(default = "default_asset_root")]
    pub root: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: default_asset_root(),
        }
    }
}

/// Generation API endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL (default: Google generative language API)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name inserted into the request path
    #[serde(default = "default_model")]
    pub model: String,

    /// Whole-request timeout in seconds (default: 120)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Where the API key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretSource {
    /// Environment variable named by `name`
    #[default]
    Env,
    /// File at path `name` (mounted secret)
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub source: SecretSource,

    /// Variable name or file path, depending on `source`
    #[serde(default = "default_secret_name")]
    pub name: String,
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            source: SecretSource::default(),
            name: default_secret_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, overridden by RUST_LOG (default: "info")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        if let Some(var_name) = missing {
            return Err(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            ));
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.assets.root.as_os_str().is_empty() {
            return Err("Asset root cannot be empty".to_string());
        }

        self.overlay.validate()?;

        if self.upstream.base_url.is_empty() {
            return Err("Upstream base_url cannot be empty".to_string());
        }
        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err(format!(
                "Upstream base_url must start with http:// or https://, got '{}'",
                self.upstream.base_url
            ));
        }
        if self.upstream.model.trim().is_empty() {
            return Err("Upstream model cannot be empty".to_string());
        }
        if self.upstream.timeout_secs == 0 {
            return Err("Upstream timeout_secs must be greater than 0".to_string());
        }

        if self.secret.name.trim().is_empty() {
            return Err("Secret name cannot be empty".to_string());
        }

        if self.logging.level.trim().is_empty() {
            return Err("Logging level cannot be empty".to_string());
        }

        Ok(())
    }

    pub fn asset_root(&self) -> AssetRoot {
        AssetRoot::new(&self.assets.root)
    }

    /// Engine bound to the configured overlay and asset root.
    pub fn composer(&self) -> Composer {
        Composer::new(self.overlay.clone(), self.asset_root())
    }
}
