//! Composition engine.
//!
//! Turns a raw generated image into a branded PNG. Steps run in a fixed
//! order (decode, banner, caption, logo, encode). A step that cannot run is
//! recorded in the [`ComposeReport`] and the remaining steps continue, so
//! a composition never fails as a whole: at worst the input bytes come
//! back untouched.
//!
//! # Example
//!
//! ```no_run
//! use brandgen::compose::{compose, AssetRoot, OverlayConfig};
//!
//! let raw = std::fs::read("generated.jpg").unwrap();
//! let assets = AssetRoot::new("/srv/brandgen/assets");
//!
//! let composition = compose(&raw, &OverlayConfig::default(), &assets);
//! println!("banner: {}", composition.report.banner.label());
//! std::fs::write("branded.png", composition.bytes).unwrap();
//! ```

use super::assets::AssetRoot;
use super::compositor::{Compositor, OverlayLayer};
use super::config::{CaptionStyle, LogoConfig, OverlayConfig};
use super::position::{
    banner_position, calculate_position, fraction_of_width, scale_to_width, Anchor,
    ImageDimensions, OverlayDimensions, PlacementPosition,
};
use super::text_renderer::{
    builtin_font, load_font, parse_hex_color, render_text, Stroke, TextStyle,
};
use super::ComposeError;
use ab_glyph::FontArc;
use image::imageops::{self, FilterType};
use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Overlay steps, in the order they are painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComposeStep {
    Banner,
    Caption,
    Logo,
}

impl ComposeStep {
    pub const ALL: [ComposeStep; 3] = [Self::Banner, Self::Caption, Self::Logo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Caption => "caption",
            Self::Logo => "logo",
        }
    }
}

impl std::fmt::Display for ComposeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one overlay step.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StepOutcome {
    /// Overlay painted as configured.
    Applied,
    /// Overlay painted with a fallback (built-in font).
    Degraded(ComposeError),
    /// Overlay left out; the image is otherwise intact.
    Skipped(ComposeError),
    /// The overlay variant has no such step.
    #[default]
    NotConfigured,
}

impl StepOutcome {
    /// Whether anything was painted for this step.
    pub fn is_painted(&self) -> bool {
        matches!(self, Self::Applied | Self::Degraded(_))
    }

    pub fn error(&self) -> Option<&ComposeError> {
        match self {
            Self::Degraded(err) | Self::Skipped(err) => Some(err),
            Self::Applied | Self::NotConfigured => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Degraded(_) => "degraded",
            Self::Skipped(_) => "skipped",
            Self::NotConfigured => "not_configured",
        }
    }
}

/// Per-step record of a single composition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComposeReport {
    /// Dimensions of the decoded input, if it decoded.
    pub dimensions: Option<(u32, u32)>,
    /// Set when the input could not be decoded.
    pub decode: Option<ComposeError>,
    pub banner: StepOutcome,
    pub caption: StepOutcome,
    pub logo: StepOutcome,
    /// Set when the composited image could not be encoded.
    pub encode: Option<ComposeError>,
}

impl ComposeReport {
    pub fn step(&self, step: ComposeStep) -> &StepOutcome {
        match step {
            ComposeStep::Banner => &self.banner,
            ComposeStep::Caption => &self.caption,
            ComposeStep::Logo => &self.logo,
        }
    }

    /// Whether the returned bytes are the unmodified input.
    pub fn is_passthrough(&self) -> bool {
        self.decode.is_some() || self.encode.is_some()
    }

    /// All recorded errors, in step order.
    pub fn errors(&self) -> Vec<&ComposeError> {
        let mut errors: Vec<&ComposeError> = self.decode.iter().collect();
        errors.extend(ComposeStep::ALL.iter().filter_map(|s| self.step(*s).error()));
        errors.extend(self.encode.iter());
        errors
    }
}

/// Output of [`compose`].
#[derive(Debug, Clone)]
pub struct Composition {
    /// PNG bytes, or the original input when decoding or encoding failed.
    pub bytes: Vec<u8>,
    pub report: ComposeReport,
}

/// Overlay configuration bound to its asset root.
#[derive(Debug, Clone)]
pub struct Composer {
    overlay: OverlayConfig,
    assets: AssetRoot,
}

impl Composer {
    pub fn new(overlay: OverlayConfig, assets: AssetRoot) -> Self {
        Self { overlay, assets }
    }

    pub fn overlay(&self) -> &OverlayConfig {
        &self.overlay
    }

    pub fn assets(&self) -> &AssetRoot {
        &self.assets
    }

    pub fn compose(&self, raw: &[u8]) -> Composition {
        compose(raw, &self.overlay, &self.assets)
    }
}

/// Compose the configured overlay onto an encoded image.
///
/// Never fails: problems are recorded in the returned report.
pub fn compose(raw: &[u8], config: &OverlayConfig, assets: &AssetRoot) -> Composition {
    let mut report = ComposeReport::default();

    let mut canvas = match decode_image(raw) {
        Ok(image) => image.to_rgba8(),
        Err(err) => {
            tracing::warn!(
                variant = config.variant_name(),
                input_bytes = raw.len(),
                error = %err,
                "Input image could not be decoded, returning it unchanged"
            );
            report.decode = Some(err);
            return Composition {
                bytes: raw.to_vec(),
                report,
            };
        }
    };
    report.dimensions = Some(canvas.dimensions());

    apply_overlay(&mut canvas, config, assets, &mut report);

    let bytes = match encode_png(canvas) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "Composited image could not be encoded, returning input");
            report.encode = Some(err);
            raw.to_vec()
        }
    };

    tracing::debug!(
        variant = config.variant_name(),
        banner = report.banner.label(),
        caption = report.caption.label(),
        logo = report.logo.label(),
        output_bytes = bytes.len(),
        "Composition finished"
    );

    Composition { bytes, report }
}

/// Convenience wrapper returning only the output bytes.
pub fn compose_bytes(raw: &[u8], config: &OverlayConfig, assets: &AssetRoot) -> Vec<u8> {
    compose(raw, config, assets).bytes
}

/// Run the overlay steps against a decoded canvas, recording each outcome.
pub fn apply_overlay(
    canvas: &mut RgbaImage,
    config: &OverlayConfig,
    assets: &AssetRoot,
    report: &mut ComposeReport,
) {
    let dims = ImageDimensions {
        width: canvas.width(),
        height: canvas.height(),
    };
    let mut compositor = Compositor::new();

    if let Some(banner) = config.banner() {
        report.banner = record(
            ComposeStep::Banner,
            banner_layer(&banner.path, &dims, assets).map(|layer| {
                compositor.add_layer(layer);
                None
            }),
        );
    }

    if let Some(style) = config.caption() {
        report.caption = record(
            ComposeStep::Caption,
            caption_layers(style, &dims, assets).map(|(layers, font_error)| {
                for layer in layers {
                    compositor.add_layer(layer);
                }
                font_error
            }),
        );
    }

    if let Some(logo) = config.logo() {
        report.logo = record(
            ComposeStep::Logo,
            logo_layer(logo, &dims, assets).map(|layer| {
                compositor.add_layer(layer);
                None
            }),
        );
    }

    compositor.apply(canvas);
}

/// Turn a step result into an outcome and log anything that went wrong.
///
/// `Ok(Some(err))` means the step painted with a fallback.
fn record(step: ComposeStep, result: Result<Option<ComposeError>, ComposeError>) -> StepOutcome {
    match result {
        Ok(None) => StepOutcome::Applied,
        Ok(Some(err)) => {
            tracing::warn!(step = %step, kind = err.kind(), error = %err, "Overlay step degraded");
            StepOutcome::Degraded(err)
        }
        Err(err) => {
            tracing::warn!(step = %step, kind = err.kind(), error = %err, "Overlay step skipped");
            StepOutcome::Skipped(err)
        }
    }
}

fn banner_layer(
    path: &Path,
    image: &ImageDimensions,
    assets: &AssetRoot,
) -> Result<OverlayLayer, ComposeError> {
    let banner = assets.load_image(path)?;
    let scaled = fit_to_width(banner, image.width, "banner")?;

    let dims = OverlayDimensions {
        width: scaled.width(),
        height: scaled.height(),
    };
    Ok(OverlayLayer::auto(scaled, banner_position(image, &dims)))
}

fn logo_layer(
    config: &LogoConfig,
    image: &ImageDimensions,
    assets: &AssetRoot,
) -> Result<OverlayLayer, ComposeError> {
    let logo = assets.load_image(&config.path)?;
    let target_width = fraction_of_width(image, config.width_fraction);
    let scaled = fit_to_width(logo, target_width, "logo")?;

    let dims = OverlayDimensions {
        width: scaled.width(),
        height: scaled.height(),
    };
    let margin = fraction_of_width(image, config.margin_fraction);
    let position = calculate_position(Anchor::BottomRight, image, &dims, margin);
    Ok(OverlayLayer::alpha(scaled, position))
}

/// Resize an asset to `target_width`, keeping its aspect ratio.
fn fit_to_width(
    asset: RgbaImage,
    target_width: u32,
    what: &str,
) -> Result<RgbaImage, ComposeError> {
    let source = OverlayDimensions {
        width: asset.width(),
        height: asset.height(),
    };
    let target = scale_to_width(&source, target_width).ok_or_else(|| {
        ComposeError::Render(format!(
            "{} {}x{} cannot be scaled to width {}",
            what, source.width, source.height, target_width
        ))
    })?;

    if target == source {
        return Ok(asset);
    }
    Ok(imageops::resize(
        &asset,
        target.width,
        target.height,
        FilterType::Lanczos3,
    ))
}

/// Build the caption layers: an optional panel, then the text.
///
/// Returns the font error when the built-in font had to stand in.
fn caption_layers(
    style: CaptionStyle<'_>,
    image: &ImageDimensions,
    assets: &AssetRoot,
) -> Result<(Vec<OverlayLayer>, Option<ComposeError>), ComposeError> {
    let (font, font_error) = resolve_font(style.font_path().map(|p| p.as_path()), assets);
    let font_size = style.font_size().resolve(image.width);

    let layers = match style {
        CaptionStyle::Stroked(caption) => {
            let text_style = TextStyle {
                font_size,
                color: parse_hex_color(&caption.color)?,
                stroke: Some(Stroke {
                    width: caption.stroke_width,
                    color: parse_hex_color(&caption.stroke_color)?,
                }),
                line_spacing: 0.0,
            };
            let rendered = render_text(&font, &caption.text, &text_style)?;

            // The rendered image carries a stroke border around the text box
            let pad = caption.stroke_width;
            let text_box = OverlayDimensions {
                width: rendered.width().saturating_sub(2 * pad),
                height: rendered.height().saturating_sub(2 * pad),
            };
            let position = calculate_position(Anchor::BottomRight, image, &text_box, caption.margin)
                .offset(-(pad as i32), -(pad as i32));

            vec![OverlayLayer::alpha(rendered, position)]
        }
        CaptionStyle::Boxed(caption_box) => {
            let text_style = TextStyle {
                font_size,
                color: parse_hex_color(&caption_box.color)?,
                stroke: None,
                line_spacing: caption_box.line_spacing,
            };
            let box_color = parse_hex_color(&caption_box.box_color)?;
            let rendered = render_text(&font, &caption_box.text, &text_style)?;

            let padding = caption_box.padding;
            let panel = panel_size(&rendered, padding)?;
            let panel_position =
                calculate_position(Anchor::BottomLeft, image, &panel, caption_box.margin);
            let inset = i32::try_from(padding).unwrap_or(i32::MAX);
            let text_position: PlacementPosition = panel_position.offset(inset, inset);

            vec![
                OverlayLayer::panel(
                    panel.width,
                    panel.height,
                    box_color.with_alpha(u8::MAX),
                    caption_box.box_opacity,
                    panel_position,
                ),
                OverlayLayer::alpha(rendered, text_position),
            ]
        }
    };

    Ok((layers, font_error))
}

/// Rendered text plus `padding` on every side.
fn panel_size(rendered: &RgbaImage, padding: u32) -> Result<OverlayDimensions, ComposeError> {
    let grow = |side: u32| padding.checked_mul(2).and_then(|border| side.checked_add(border));
    match (grow(rendered.width()), grow(rendered.height())) {
        (Some(width), Some(height)) => Ok(OverlayDimensions { width, height }),
        _ => Err(ComposeError::Render(format!(
            "Caption panel padding {} is too large",
            padding
        ))),
    }
}

/// Load the configured font, falling back to the built-in one.
fn resolve_font(path: Option<&Path>, assets: &AssetRoot) -> (FontArc, Option<ComposeError>) {
    match path {
        None => (builtin_font(), None),
        Some(path) => match load_font(&assets.resolve(path)) {
            Ok(font) => (font, None),
            Err(err) => (builtin_font(), Some(err)),
        },
    }
}

fn decode_image(data: &[u8]) -> Result<DynamicImage, ComposeError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ComposeError::DecodeFailure(e.to_string()))?
        .decode()
        .map_err(|e| ComposeError::DecodeFailure(e.to_string()))
}

fn encode_png(canvas: RgbaImage) -> Result<Vec<u8>, ComposeError> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| ComposeError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}
