//! Overlay compositor for painting overlays onto the base image.
//!
//! Layers are collected first and painted in insertion order, so the
//! engine decides the stacking (banner, caption panel, caption text, logo)
//! and the canvas is only touched once every layer is ready.
//!
//! # Example
//!
//! ```
//! use brandgen::compose::compositor::{Compositor, OverlayLayer};
//! use brandgen::compose::position::PlacementPosition;
//! use image::{Rgba, RgbaImage};
//!
//! let mut base = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
//! let banner = RgbaImage::from_pixel(100, 10, Rgba([0, 0, 255, 255]));
//!
//! let mut compositor = Compositor::new();
//! compositor.add_layer(OverlayLayer::opaque(banner, PlacementPosition::new(0, 90)));
//! compositor.apply(&mut base);
//!
//! assert_eq!(base.get_pixel(50, 95), &Rgba([0, 0, 255, 255]));
//! ```

use super::position::PlacementPosition;
use image::{Rgba, RgbaImage};

/// How a layer is combined with the pixels beneath it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlendMode {
    /// Use the layer's own alpha as the blend mask, scaled by `opacity`.
    Alpha { opacity: f32 },
    /// Copy the layer's pixels verbatim.
    Opaque,
}

/// An overlay to be composited onto the base image.
#[derive(Clone)]
pub struct OverlayLayer {
    /// The overlay pixels (RGBA).
    pub image: RgbaImage,
    /// Top-left corner of the overlay on the base image.
    pub position: PlacementPosition,
    pub mode: BlendMode,
}

impl std::fmt::Debug for OverlayLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayLayer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("position", &self.position)
            .field("mode", &self.mode)
            .finish()
    }
}

impl OverlayLayer {
    /// Layer blended through its own alpha channel.
    pub fn alpha(image: RgbaImage, position: PlacementPosition) -> Self {
        Self {
            image,
            position,
            mode: BlendMode::Alpha { opacity: 1.0 },
        }
    }

    /// Layer pasted without blending.
    pub fn opaque(image: RgbaImage, position: PlacementPosition) -> Self {
        Self {
            image,
            position,
            mode: BlendMode::Opaque,
        }
    }

    /// Alpha-blended layer when the image has any transparency, opaque paste otherwise.
    pub fn auto(image: RgbaImage, position: PlacementPosition) -> Self {
        if has_transparency(&image) {
            Self::alpha(image, position)
        } else {
            Self::opaque(image, position)
        }
    }

    /// Solid rectangle of `color` blended at `opacity`.
    pub fn panel(
        width: u32,
        height: u32,
        color: Rgba<u8>,
        opacity: f32,
        position: PlacementPosition,
    ) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, color),
            position,
            mode: BlendMode::Alpha { opacity },
        }
    }
}

/// Compositor for applying overlay layers to an image.
#[derive(Debug, Default)]
pub struct Compositor {
    layers: Vec<OverlayLayer>,
}

impl Compositor {
    /// Create a new compositor with no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an overlay layer to the compositor.
    pub fn add_layer(&mut self, layer: OverlayLayer) {
        self.layers.push(layer);
    }

    /// Apply all layers to the target image, in the order they were added.
    ///
    /// The target keeps its dimensions; anything outside it is clipped.
    pub fn apply(&self, target: &mut RgbaImage) {
        for layer in &self.layers {
            paint_layer(target, layer);
        }
    }
}

/// Whether any pixel of the image is not fully opaque.
pub fn has_transparency(image: &RgbaImage) -> bool {
    image.pixels().any(|p| p[3] < u8::MAX)
}

/// Paint a single layer onto the target image.
fn paint_layer(target: &mut RgbaImage, layer: &OverlayLayer) {
    let origin_x = layer.position.x as i64;
    let origin_y = layer.position.y as i64;

    // Visible region, clamped to target bounds
    let x_start = origin_x.max(0);
    let y_start = origin_y.max(0);
    let x_end = (origin_x + layer.image.width() as i64).min(target.width() as i64);
    let y_end = (origin_y + layer.image.height() as i64).min(target.height() as i64);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let lx = (tx - origin_x) as u32;
            let ly = (ty - origin_y) as u32;

            let source = *layer.image.get_pixel(lx, ly);
            let painted = match layer.mode {
                BlendMode::Opaque => source,
                BlendMode::Alpha { opacity } => {
                    blend_pixels(*target.get_pixel(tx as u32, ty as u32), source, opacity)
                }
            };
            target.put_pixel(tx as u32, ty as u32, painted);
        }
    }
}

/// Blend two pixels using alpha compositing with additional opacity.
///
/// Uses the "over" operator: result = foreground + background * (1 - foreground.alpha)
pub(crate) fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = background[3] as f32 / 255.0;

    // Porter-Duff "over" operator
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
