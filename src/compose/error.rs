//! Composition error types.
//!
//! Every overlay step reports one of these instead of failing the whole
//! composition. The engine records them in a [`ComposeReport`] so callers
//! can tell which degrade path was taken.
//!
//! [`ComposeReport`]: super::ComposeReport

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while composing a branded image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    /// Overlay asset (banner or logo) does not exist or cannot be decoded.
    #[error("Overlay asset {} unavailable: {reason}", path.display())]
    AssetMissing { path: PathBuf, reason: String },

    /// Configured font could not be loaded; the built-in font is used instead.
    #[error("Font {} unavailable, using built-in font: {reason}", path.display())]
    FontUnavailable { path: PathBuf, reason: String },

    /// Input bytes are not a decodable still image.
    #[error("Failed to decode base image: {0}")]
    DecodeFailure(String),

    /// Overlay could not be rendered (degenerate geometry, empty text, ...).
    #[error("Failed to render overlay: {0}")]
    Render(String),

    /// Composited buffer could not be encoded as PNG.
    #[error("Failed to encode composited image: {0}")]
    Encode(String),
}

impl ComposeError {
    pub fn asset_missing(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::AssetMissing {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn font_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FontUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-friendly name, used as a log field and metrics key.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AssetMissing { .. } => "asset_missing",
            Self::FontUnavailable { .. } => "font_unavailable",
            Self::DecodeFailure(_) => "decode_failure",
            Self::Render(_) => "render",
            Self::Encode(_) => "encode",
        }
    }
}
