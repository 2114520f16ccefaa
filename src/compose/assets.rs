//! Overlay asset loading.
//!
//! Banner, logo and font files live under one asset root fixed per
//! deployment. Relative paths are joined onto the root; absolute paths are
//! used as-is. Assets are read from disk on every call, nothing is cached.
//!
//! # Example
//!
//! ```
//! use brandgen::compose::assets::AssetRoot;
//! use std::path::Path;
//!
//! let assets = AssetRoot::new("/srv/brandgen/assets");
//! assert_eq!(
//!     assets.resolve(Path::new("bottom_banner.png")),
//!     Path::new("/srv/brandgen/assets/bottom_banner.png")
//! );
//! ```

use super::ComposeError;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Directory all overlay assets are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoot {
    root: PathBuf,
}

impl AssetRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an asset path against the root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Load an overlay image and normalize it to RGBA.
    ///
    /// # Errors
    ///
    /// Returns `ComposeError::AssetMissing` if the file cannot be read or
    /// is not a decodable image.
    pub fn load_image(&self, path: &Path) -> Result<RgbaImage, ComposeError> {
        let resolved = self.resolve(path);

        let data =
            std::fs::read(&resolved).map_err(|e| ComposeError::asset_missing(&resolved, e))?;

        let format = detect_image_format(&data, &resolved)
            .ok_or_else(|| ComposeError::asset_missing(&resolved, "unrecognized image format"))?;

        let image = image::load(Cursor::new(data), format)
            .map_err(|e| ComposeError::asset_missing(&resolved, e))?;

        tracing::debug!(
            path = %resolved.display(),
            width = image.width(),
            height = image.height(),
            "Loaded overlay asset"
        );

        Ok(image.to_rgba8())
    }
}

/// Detect image format from magic bytes, falling back to the file extension.
fn detect_image_format(data: &[u8], path: &Path) -> Option<ImageFormat> {
    if let Ok(format) = image::guess_format(data) {
        return Some(format);
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "gif" => Some(ImageFormat::Gif),
        "webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}
