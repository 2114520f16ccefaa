//! Overlay placement geometry.
//!
//! All overlays are anchored to the bottom of the image: the banner spans
//! the bottom edge, captions sit in the bottom-left or bottom-right corner,
//! the logo sits in the bottom-right corner.
//!
//! # Example
//!
//! ```
//! use brandgen::compose::position::{calculate_position, Anchor, ImageDimensions, OverlayDimensions};
//!
//! let image = ImageDimensions { width: 800, height: 600 };
//! let caption = OverlayDimensions { width: 100, height: 50 };
//!
//! let pos = calculate_position(Anchor::BottomRight, &image, &caption, 15);
//! assert_eq!((pos.x, pos.y), (685, 535)); // 800 - 100 - 15, 600 - 50 - 15
//! ```

/// Dimensions of the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of an overlay to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayDimensions {
    pub width: u32,
    pub height: u32,
}

/// Top-left corner where an overlay is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift the position by the given offsets.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// Corner an overlay is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    BottomLeft,
    BottomRight,
}

/// Calculate where an overlay goes for the given anchor and margin.
///
/// Coordinates may be negative when the overlay is larger than the image;
/// the compositor clips whatever falls outside.
pub fn calculate_position(
    anchor: Anchor,
    image: &ImageDimensions,
    overlay: &OverlayDimensions,
    margin: u32,
) -> PlacementPosition {
    let img_w = image.width as i64;
    let img_h = image.height as i64;
    let ov_w = overlay.width as i64;
    let ov_h = overlay.height as i64;
    let m = margin as i64;

    let y = img_h - ov_h - m;
    match anchor {
        Anchor::BottomLeft => PlacementPosition::new(clamp_coord(m), clamp_coord(y)),
        Anchor::BottomRight => {
            PlacementPosition::new(clamp_coord(img_w - ov_w - m), clamp_coord(y))
        }
    }
}

fn clamp_coord(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Scale an asset to `target_width`, preserving its aspect ratio.
///
/// The new height is `floor(asset_height * target_width / asset_width)`,
/// computed in integers so the result is exact and deterministic.
/// Returns `None` for a zero-width asset or when the height rounds to zero.
pub fn scale_to_width(asset: &OverlayDimensions, target_width: u32) -> Option<OverlayDimensions> {
    if asset.width == 0 || target_width == 0 {
        return None;
    }

    let height = (asset.height as u64 * target_width as u64) / asset.width as u64;
    if height == 0 || height > u32::MAX as u64 {
        return None;
    }

    Some(OverlayDimensions {
        width: target_width,
        height: height as u32,
    })
}

/// Pixel length of `fraction` of the image width, rounded down.
pub fn fraction_of_width(image: &ImageDimensions, fraction: f32) -> u32 {
    (image.width as f32 * fraction).floor().max(0.0) as u32
}

/// Banner placement: flush with the left and bottom edges.
pub fn banner_position(image: &ImageDimensions, banner: &OverlayDimensions) -> PlacementPosition {
    PlacementPosition::new(0, clamp_coord(image.height as i64 - banner.height as i64))
}
