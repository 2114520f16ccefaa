//! Caption text rendering.
//!
//! Renders (possibly multi-line) caption text to a transparent RGBA image
//! that the compositor can place on the base image.
//!
//! # Features
//!
//! - Hex color parsing (#RGB and #RRGGBB formats)
//! - Fonts loaded from a file, with an embedded fallback font
//! - Multi-line measurement and layout
//! - Stroke outline for legibility over arbitrary backgrounds
//!
//! # Example
//!
//! ```
//! use brandgen::compose::text_renderer::{builtin_font, render_text, Color, Stroke, TextStyle};
//!
//! let style = TextStyle {
//!     font_size: 24.0,
//!     color: Color::white(),
//!     stroke: Some(Stroke { width: 2, color: Color::black() }),
//!     line_spacing: 0.0,
//! };
//!
//! let image = render_text(&builtin_font(), "Made Possible By Google", &style).unwrap();
//! assert!(image.width() > 0);
//! ```

use super::compositor::blend_pixels;
use super::ComposeError;
use crate::constants::{MAX_STROKE_WIDTH, MAX_TEXT_CANVAS_PIXELS};
use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::OnceLock;

/// Fallback font used when no font is configured or the configured one fails to load.
static BUILTIN_FONT: OnceLock<FontArc> = OnceLock::new();

/// Embedded font data (DejaVu Sans Mono, freely redistributable).
const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");

/// Get the built-in font, initializing it lazily.
pub fn builtin_font() -> FontArc {
    BUILTIN_FONT
        .get_or_init(|| {
            FontArc::try_from_slice(EMBEDDED_FONT_DATA)
                .expect("Failed to load embedded font - this is a bug")
        })
        .clone()
}

/// Load a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> Result<FontArc, ComposeError> {
    let data = std::fs::read(path).map_err(|e| ComposeError::font_unavailable(path, e))?;
    FontArc::try_from_vec(data).map_err(|e| ComposeError::font_unavailable(path, e))
}

/// Parsed RGB color from hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn with_alpha(self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }
}

/// Stroke outline drawn around every glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Outline width in pixels.
    pub width: u32,
    pub color: Color,
}

/// Options for text rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f32,
    /// Fill color.
    pub color: Color,
    /// Optional outline.
    pub stroke: Option<Stroke>,
    /// Extra spacing between lines in pixels.
    pub line_spacing: f32,
}

/// Bounding box of laid-out text, excluding any stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: u32,
    pub height: u32,
    pub line_count: usize,
}

/// Parse a hex color string into RGB components.
///
/// Supports both #RGB and #RRGGBB formats.
pub fn parse_hex_color(hex: &str) -> Result<Color, ComposeError> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| ComposeError::Render(format!("Color must start with '#', got '{}'", hex)))?;

    let channel = |s: &str| {
        u8::from_str_radix(s, 16)
            .map_err(|_| ComposeError::Render(format!("Invalid hex digit in color '{}'", hex)))
    };

    match digits.len() {
        3 => {
            // #RGB: each digit doubled, 0xF -> 0xFF
            let r = channel(&digits[0..1])?;
            let g = channel(&digits[1..2])?;
            let b = channel(&digits[2..3])?;
            Ok(Color::new(r * 17, g * 17, b * 17))
        }
        6 => Ok(Color::new(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        n => Err(ComposeError::Render(format!(
            "Color must be #RGB or #RRGGBB format, got {} characters",
            n
        ))),
    }
}

fn line_width<F: Font>(font: &F, scale: PxScale, line: &str) -> f32 {
    let scaled_font = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev_glyph: Option<GlyphId> = None;

    for c in line.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            width += scaled_font.kern(prev, glyph_id);
        }
        width += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width
}

/// Distance between consecutive baselines.
fn line_advance<F: Font>(font: &F, scale: PxScale, line_spacing: f32) -> f32 {
    let scaled_font = font.as_scaled(scale);
    scaled_font.height() + scaled_font.line_gap() + line_spacing
}

/// Measure the bounding box of multi-line text.
pub fn measure_text(font: &FontArc, text: &str, font_size: f32, line_spacing: f32) -> TextMetrics {
    let scale = PxScale::from(font_size);
    let scaled_font = font.as_scaled(scale);

    let lines: Vec<&str> = text.lines().collect();
    let line_count = lines.len().max(1);

    let width = lines
        .iter()
        .map(|line| line_width(font, scale, line))
        .fold(0.0f32, f32::max);
    let height = scaled_font.height()
        + (line_count - 1) as f32 * line_advance(font, scale, line_spacing);

    TextMetrics {
        width: width.ceil() as u32,
        height: height.ceil() as u32,
        line_count,
    }
}

/// Render text to a transparent RGBA image.
///
/// The text bounding box starts at `(stroke_width, stroke_width)` inside the
/// returned image; the border leaves room for the outline.
pub fn render_text(font: &FontArc, text: &str, style: &TextStyle) -> Result<RgbaImage, ComposeError> {
    if text.trim().is_empty() {
        return Err(ComposeError::Render("Cannot render empty text".to_string()));
    }
    if !style.font_size.is_finite() || style.font_size <= 0.0 {
        return Err(ComposeError::Render(format!(
            "Invalid font size {}",
            style.font_size
        )));
    }

    let pad = style.stroke.map(|s| s.width).unwrap_or(0);
    if pad > MAX_STROKE_WIDTH {
        return Err(ComposeError::Render(format!(
            "Stroke width {} exceeds the maximum of {}",
            pad, MAX_STROKE_WIDTH
        )));
    }

    let scale = PxScale::from(style.font_size);
    let scaled_font = font.as_scaled(scale);
    let metrics = measure_text(font, text, style.font_size, style.line_spacing);
    let (canvas_width, canvas_height) = canvas_size(&metrics, pad)?;

    let mut coverage = vec![0.0f32; (canvas_width * canvas_height) as usize];
    let advance = line_advance(font, scale, style.line_spacing);

    for (index, line) in text.lines().enumerate() {
        let baseline_y = pad as f32 + scaled_font.ascent() + index as f32 * advance;
        let mut cursor_x = pad as f32;
        let mut prev_glyph: Option<GlyphId> = None;

        for c in line.chars() {
            let glyph_id = scaled_font.glyph_id(c);
            if let Some(prev) = prev_glyph {
                cursor_x += scaled_font.kern(prev, glyph_id);
            }

            let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, baseline_y));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, c| {
                    let x = px as i32 + bounds.min.x as i32;
                    let y = py as i32 + bounds.min.y as i32;
                    if x >= 0 && y >= 0 && x < canvas_width as i32 && y < canvas_height as i32 {
                        let idx = (y as u32 * canvas_width + x as u32) as usize;
                        coverage[idx] = coverage[idx].max(c.clamp(0.0, 1.0));
                    }
                });
            }

            cursor_x += scaled_font.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }
    }

    let outline = style
        .stroke
        .filter(|s| s.width > 0)
        .map(|s| (dilate(&coverage, canvas_width, canvas_height, s.width), s.color));

    let mut image = RgbaImage::new(canvas_width, canvas_height);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let idx = (y * canvas_width + x) as usize;
        let mut out = Rgba([0, 0, 0, 0]);

        if let Some((mask, color)) = &outline {
            out = color.with_alpha(to_alpha(mask[idx]));
        }
        if coverage[idx] > 0.0 {
            out = blend_pixels(out, style.color.with_alpha(to_alpha(coverage[idx])), 1.0);
        }

        *pixel = out;
    }

    Ok(image)
}

/// Text box plus the stroke border on every side, bounded by
/// `MAX_TEXT_CANVAS_PIXELS`.
fn canvas_size(metrics: &TextMetrics, pad: u32) -> Result<(u32, u32), ComposeError> {
    let too_large = || {
        ComposeError::Render(format!(
            "Caption {}x{} at stroke {} is too large to render",
            metrics.width, metrics.height, pad
        ))
    };

    let border = pad.checked_mul(2).ok_or_else(too_large)?;
    let width = metrics.width.checked_add(border).ok_or_else(too_large)?.max(1);
    let height = metrics.height.checked_add(border).ok_or_else(too_large)?.max(1);

    if width as u64 * height as u64 > MAX_TEXT_CANVAS_PIXELS {
        return Err(too_large());
    }
    Ok((width, height))
}

fn to_alpha(coverage: f32) -> u8 {
    (coverage * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Grow a coverage mask by `radius` pixels using a disc-shaped kernel.
fn dilate(mask: &[f32], width: u32, height: u32, radius: u32) -> Vec<f32> {
    let r = radius as i32;
    let offsets: Vec<(i32, i32)> = (-r..=r)
        .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
        .filter(|(dx, dy)| dx * dx + dy * dy <= r * r)
        .collect();

    let mut out = vec![0.0f32; mask.len()];
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let mut value = 0.0f32;
            for (dx, dy) in &offsets {
                let sx = x + dx;
                let sy = y + dy;
                if sx >= 0 && sy >= 0 && sx < width as i32 && sy < height as i32 {
                    value = value.max(mask[(sy as u32 * width + sx as u32) as usize]);
                }
            }
            out[(y as u32 * width + x as u32) as usize] = value;
        }
    }
    out
}
