//! Overlay configuration types.
//!
//! The overlay is chosen once per deployment. Three variants exist:
//! - `banner-only`: banner scaled to the image width at the bottom edge
//! - `banner-caption`: banner plus a stroked caption at the bottom-right
//! - `caption-box-logo`: caption on a translucent panel at the bottom-left,
//!   plus a logo at the bottom-right
//!
//! Asset and font paths are relative to the configured asset root.

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_banner_path() -> PathBuf {
    PathBuf::from(DEFAULT_BANNER_PATH)
}

fn default_logo_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOGO_PATH)
}

fn default_caption_text() -> String {
    DEFAULT_CAPTION_TEXT.to_string()
}

fn default_caption_font_size() -> FontSizePolicy {
    FontSizePolicy::Fixed {
        size: DEFAULT_CAPTION_FONT_SIZE,
    }
}

fn default_caption_box_font_size() -> FontSizePolicy {
    FontSizePolicy::Proportional {
        minimum: DEFAULT_CAPTION_BOX_MIN_FONT_SIZE,
        fraction: DEFAULT_CAPTION_BOX_FONT_FRACTION,
    }
}

fn default_caption_margin() -> u32 {
    DEFAULT_CAPTION_MARGIN
}

fn default_stroke_width() -> u32 {
    DEFAULT_STROKE_WIDTH
}

fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}

fn default_stroke_color() -> String {
    DEFAULT_STROKE_COLOR.to_string()
}

fn default_caption_box_margin() -> u32 {
    DEFAULT_CAPTION_BOX_MARGIN
}

fn default_caption_box_padding() -> u32 {
    DEFAULT_CAPTION_BOX_PADDING
}

fn default_caption_box_color() -> String {
    DEFAULT_CAPTION_BOX_COLOR.to_string()
}

fn default_caption_box_opacity() -> f32 {
    DEFAULT_CAPTION_BOX_OPACITY
}

fn default_line_spacing() -> f32 {
    DEFAULT_LINE_SPACING
}

fn default_logo_width_fraction() -> f32 {
    DEFAULT_LOGO_WIDTH_FRACTION
}

fn default_logo_margin_fraction() -> f32 {
    DEFAULT_LOGO_MARGIN_FRACTION
}

/// How the caption point size is chosen.
///
/// ```yaml
/// font_size: { mode: fixed, size: 28.0 }
/// font_size: { mode: proportional, minimum: 16.0, fraction: 0.025 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum FontSizePolicy {
    /// Literal point size.
    Fixed { size: f32 },
    /// `max(minimum, image_width * fraction)`.
    Proportional { minimum: f32, fraction: f32 },
}

impl FontSizePolicy {
    /// Resolve the point size for an image of the given width.
    pub fn resolve(&self, image_width: u32) -> f32 {
        match *self {
            Self::Fixed { size } => size,
            Self::Proportional { minimum, fraction } => minimum.max(image_width as f32 * fraction),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match *self {
            Self::Fixed { size } => {
                if !size.is_finite() || size <= 0.0 || size > MAX_FONT_SIZE {
                    return Err(format!(
                        "Fixed font size must be in (0, {}], got {}",
                        MAX_FONT_SIZE, size
                    ));
                }
            }
            Self::Proportional { minimum, fraction } => {
                if !minimum.is_finite() || minimum <= 0.0 || minimum > MAX_FONT_SIZE {
                    return Err(format!(
                        "Proportional font size minimum must be in (0, {}], got {}",
                        MAX_FONT_SIZE, minimum
                    ));
                }
                validate_fraction("font size fraction", fraction)?;
            }
        }
        Ok(())
    }
}

/// Banner scaled to the full image width and affixed to the bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerConfig {
    /// Banner image path (default: "bottom_banner.png")
    #[serde(default = "default_banner_path")]
    pub path: PathBuf,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            path: default_banner_path(),
        }
    }
}

/// Caption drawn at the bottom-right with a stroke outline and no panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Caption text (default: "Made Possible By Google")
    #[serde(default = "default_caption_text")]
    pub text: String,

    /// Font file; absent means the built-in font
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,

    /// Point size policy (default: fixed 28)
    #[serde(default = "default_caption_font_size")]
    pub font_size: FontSizePolicy,

    /// Distance from the right and bottom edges in pixels (default: 15)
    #[serde(default = "default_caption_margin")]
    pub margin: u32,

    /// Stroke outline width in pixels (default: 2)
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,

    /// Fill colour as hex string (default: "#FFFFFF")
    #[serde(default = "default_text_color")]
    pub color: String,

    /// Stroke colour as hex string (default: "#000000")
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            text: default_caption_text(),
            font_path: None,
            font_size: default_caption_font_size(),
            margin: default_caption_margin(),
            stroke_width: default_stroke_width(),
            color: default_text_color(),
            stroke_color: default_stroke_color(),
        }
    }
}

/// Multi-line caption on a translucent panel at the bottom-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionBoxConfig {
    /// Caption text; `\n` separates lines
    pub text: String,

    /// Font file; absent means the built-in font
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,

    /// Point size policy (default: max(16, width * 0.025))
    #[serde(default = "default_caption_box_font_size")]
    pub font_size: FontSizePolicy,

    /// Distance of the panel from the left and bottom edges (default: 20)
    #[serde(default = "default_caption_box_margin")]
    pub margin: u32,

    /// Padding between text and panel edge (default: 10)
    #[serde(default = "default_caption_box_padding")]
    pub padding: u32,

    /// Extra spacing between lines in pixels (default: 4)
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,

    /// Text colour as hex string (default: "#FFFFFF")
    #[serde(default = "default_text_color")]
    pub color: String,

    /// Panel colour as hex string (default: "#000000")
    #[serde(default = "default_caption_box_color")]
    pub box_color: String,

    /// Panel opacity from 0.0 to 1.0 (default: 0.5)
    #[serde(default = "default_caption_box_opacity")]
    pub box_opacity: f32,
}

/// Logo scaled to a fraction of the image width at the bottom-right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoConfig {
    /// Logo image path (default: "logo.png")
    #[serde(default = "default_logo_path")]
    pub path: PathBuf,

    /// Logo width relative to the image width (default: 0.15)
    #[serde(default = "default_logo_width_fraction")]
    pub width_fraction: f32,

    /// Margin relative to the image width (default: 0.02)
    #[serde(default = "default_logo_margin_fraction")]
    pub margin_fraction: f32,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            path: default_logo_path(),
            width_fraction: default_logo_width_fraction(),
            margin_fraction: default_logo_margin_fraction(),
        }
    }
}

/// Deployment-time overlay selection.
///
/// ```yaml
/// overlay:
///   variant: banner-caption
///   banner: { path: bottom_banner.png }
///   caption:
///     text: "Made Possible By Google"
///     font_path: fonts/brand.ttf
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "kebab-case")]
pub enum OverlayConfig {
    BannerOnly {
        #[serde(default)]
        banner: BannerConfig,
    },
    BannerCaption {
        #[serde(default)]
        banner: BannerConfig,
        #[serde(default)]
        caption: CaptionConfig,
    },
    CaptionBoxLogo {
        caption_box: CaptionBoxConfig,
        #[serde(default)]
        logo: LogoConfig,
    },
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::BannerOnly {
            banner: BannerConfig::default(),
        }
    }
}

/// Caption step parameters, whichever variant supplies them.
#[derive(Debug, Clone, Copy)]
pub enum CaptionStyle<'a> {
    Stroked(&'a CaptionConfig),
    Boxed(&'a CaptionBoxConfig),
}

impl CaptionStyle<'_> {
    pub fn font_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Stroked(c) => c.font_path.as_ref(),
            Self::Boxed(c) => c.font_path.as_ref(),
        }
    }

    pub fn font_size(&self) -> FontSizePolicy {
        match self {
            Self::Stroked(c) => c.font_size,
            Self::Boxed(c) => c.font_size,
        }
    }
}

impl OverlayConfig {
    /// Variant name as written in configuration.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::BannerOnly { .. } => "banner-only",
            Self::BannerCaption { .. } => "banner-caption",
            Self::CaptionBoxLogo { .. } => "caption-box-logo",
        }
    }

    pub fn banner(&self) -> Option<&BannerConfig> {
        match self {
            Self::BannerOnly { banner } | Self::BannerCaption { banner, .. } => Some(banner),
            Self::CaptionBoxLogo { .. } => None,
        }
    }

    pub fn caption(&self) -> Option<CaptionStyle<'_>> {
        match self {
            Self::BannerOnly { .. } => None,
            Self::BannerCaption { caption, .. } => Some(CaptionStyle::Stroked(caption)),
            Self::CaptionBoxLogo { caption_box, .. } => Some(CaptionStyle::Boxed(caption_box)),
        }
    }

    pub fn logo(&self) -> Option<&LogoConfig> {
        match self {
            Self::CaptionBoxLogo { logo, .. } => Some(logo),
            _ => None,
        }
    }

    /// Validate the overlay configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(banner) = self.banner() {
            validate_path("banner path", &banner.path)?;
        }

        match self.caption() {
            Some(CaptionStyle::Stroked(caption)) => {
                validate_text(&caption.text)?;
                caption.font_size.validate()?;
                if caption.stroke_width > MAX_STROKE_WIDTH {
                    return Err(format!(
                        "Caption stroke_width must be at most {}, got {}",
                        MAX_STROKE_WIDTH, caption.stroke_width
                    ));
                }
                validate_hex_color("caption color", &caption.color)?;
                validate_hex_color("caption stroke_color", &caption.stroke_color)?;
            }
            Some(CaptionStyle::Boxed(caption_box)) => {
                validate_text(&caption_box.text)?;
                caption_box.font_size.validate()?;
                if caption_box.padding > MAX_CAPTION_BOX_PADDING {
                    return Err(format!(
                        "Caption box padding must be at most {}, got {}",
                        MAX_CAPTION_BOX_PADDING, caption_box.padding
                    ));
                }
                validate_hex_color("caption box color", &caption_box.color)?;
                validate_hex_color("caption box box_color", &caption_box.box_color)?;
                if !caption_box.box_opacity.is_finite()
                    || !(0.0..=1.0).contains(&caption_box.box_opacity)
                {
                    return Err(format!(
                        "Caption box opacity must be a finite value between 0.0 and 1.0, got {}",
                        caption_box.box_opacity
                    ));
                }
                if !caption_box.line_spacing.is_finite() || caption_box.line_spacing < 0.0 {
                    return Err(format!(
                        "Caption box line_spacing must be a non-negative finite value, got {}",
                        caption_box.line_spacing
                    ));
                }
            }
            None => {}
        }

        if let Some(logo) = self.logo() {
            validate_path("logo path", &logo.path)?;
            validate_fraction("logo width_fraction", logo.width_fraction)?;
            if !logo.margin_fraction.is_finite() || !(0.0..1.0).contains(&logo.margin_fraction) {
                return Err(format!(
                    "Logo margin_fraction must be a finite value in [0.0, 1.0), got {}",
                    logo.margin_fraction
                ));
            }
        }

        Ok(())
    }
}

fn validate_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Caption 'text' field cannot be empty".to_string());
    }
    Ok(())
}

fn validate_path(field: &str, path: &std::path::Path) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        return Err(format!("Overlay {} cannot be empty", field));
    }
    Ok(())
}

fn validate_fraction(field: &str, value: f32) -> Result<(), String> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(format!(
            "Overlay {} must be a finite value in (0.0, 1.0], got {}",
            field, value
        ));
    }
    Ok(())
}

/// Validate hex color format (#RGB or #RRGGBB).
fn validate_hex_color(field: &str, color: &str) -> Result<(), String> {
    if let Some(hex_part) = color.strip_prefix('#') {
        let len = hex_part.len();
        if (len != 3 && len != 6) || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "Overlay {} must be in #RGB or #RRGGBB format with valid hex characters, got '{}'",
                field, color
            ));
        }
        Ok(())
    } else {
        Err(format!(
            "Overlay {} must be a hex string starting with '#', got '{}'",
            field, color
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caption_box(text: &str) -> CaptionBoxConfig {
        CaptionBoxConfig {
            text: text.to_string(),
            font_path: None,
            font_size: default_caption_box_font_size(),
            margin: 20,
            padding: 10,
            line_spacing: 4.0,
            color: "#FFFFFF".to_string(),
            box_color: "#000000".to_string(),
            box_opacity: 0.5,
        }
    }

    #[test]
    fn test_banner_only_deserialize_defaults() {
        let yaml = "variant: banner-only\n";
        let config: OverlayConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config, OverlayConfig::default());
        assert_eq!(
            config.banner().unwrap().path,
            PathBuf::from("bottom_banner.png")
        );
        assert!(config.caption().is_none());
        assert!(config.logo().is_none());
    }

    #[test]
    fn test_banner_caption_deserialize() {
        let yaml = r##"
variant: banner-caption
banner:
  path: brand/banner.png
caption:
  text: "Made Possible By Google"
  font_path: fonts/brand.ttf
  font_size: { mode: fixed, size: 32.0 }
  margin: 15
  stroke_width: 3
"##;
        let config: OverlayConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.variant_name(), "banner-caption");
        assert_eq!(config.banner().unwrap().path, PathBuf::from("brand/banner.png"));
        match config.caption() {
            Some(CaptionStyle::Stroked(caption)) => {
                assert_eq!(caption.text, "Made Possible By Google");
                assert_eq!(caption.font_path, Some(PathBuf::from("fonts/brand.ttf")));
                assert_eq!(caption.font_size, FontSizePolicy::Fixed { size: 32.0 });
                assert_eq!(caption.stroke_width, 3);
                assert_eq!(caption.color, "#FFFFFF"); // default
                assert_eq!(caption.stroke_color, "#000000"); // default
            }
            other => panic!("Expected stroked caption, got {:?}", other),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_caption_box_logo_deserialize() {
        let yaml = r##"
variant: caption-box-logo
caption_box:
  text: "Generated with AI\nHong Kong"
  font_size: { mode: proportional, minimum: 18.0, fraction: 0.03 }
logo:
  path: logo.png
  width_fraction: 0.2
"##;
        let config: OverlayConfig = serde_yaml::from_str(yaml).unwrap();

        assert!(config.banner().is_none());
        match config.caption() {
            Some(CaptionStyle::Boxed(caption_box)) => {
                assert_eq!(caption_box.text.lines().count(), 2);
                assert_eq!(caption_box.padding, 10); // default
                assert_eq!(caption_box.box_opacity, 0.5); // default
            }
            other => panic!("Expected boxed caption, got {:?}", other),
        }
        let logo = config.logo().unwrap();
        assert_eq!(logo.width_fraction, 0.2);
        assert_eq!(logo.margin_fraction, 0.02); // default
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let yaml = "variant: watermark-grid\n";
        let result: Result<OverlayConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_font_size_policy_resolve() {
        let fixed = FontSizePolicy::Fixed { size: 28.0 };
        assert_eq!(fixed.resolve(100), 28.0);
        assert_eq!(fixed.resolve(4000), 28.0);

        let proportional = FontSizePolicy::Proportional {
            minimum: 16.0,
            fraction: 0.025,
        };
        // 400 * 0.025 = 10 < 16
        assert_eq!(proportional.resolve(400), 16.0);
        // 2000 * 0.025 = 50
        assert_eq!(proportional.resolve(2000), 50.0);
    }

    #[test]
    fn test_validate_empty_caption_text() {
        let config = OverlayConfig::BannerCaption {
            banner: BannerConfig::default(),
            caption: CaptionConfig {
                text: "   ".to_string(),
                ..CaptionConfig::default()
            },
        };
        let result = config.validate();
        assert!(result.unwrap_err().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_invalid_colors() {
        let config = OverlayConfig::BannerCaption {
            banner: BannerConfig::default(),
            caption: CaptionConfig {
                stroke_color: "black".to_string(),
                ..CaptionConfig::default()
            },
        };
        assert!(config.validate().unwrap_err().contains("hex string"));

        let config = OverlayConfig::BannerCaption {
            banner: BannerConfig::default(),
            caption: CaptionConfig {
                color: "#FFFFF".to_string(),
                ..CaptionConfig::default()
            },
        };
        assert!(config.validate().unwrap_err().contains("#RGB or #RRGGBB"));
    }

    #[test]
    fn test_validate_font_size_policy() {
        let config = OverlayConfig::BannerCaption {
            banner: BannerConfig::default(),
            caption: CaptionConfig {
                font_size: FontSizePolicy::Fixed { size: f32::NAN },
                ..CaptionConfig::default()
            },
        };
        assert!(config.validate().is_err());

        let mut boxed = caption_box("Hello");
        boxed.font_size = FontSizePolicy::Proportional {
            minimum: 12.0,
            fraction: 1.5,
        };
        let config = OverlayConfig::CaptionBoxLogo {
            caption_box: boxed,
            logo: LogoConfig::default(),
        };
        assert!(config.validate().unwrap_err().contains("font size fraction"));
    }

    #[test]
    fn test_validate_font_size_upper_bound() {
        let config = OverlayConfig::BannerCaption {
            banner: BannerConfig::default(),
            caption: CaptionConfig {
                font_size: FontSizePolicy::Fixed { size: 100_000.0 },
                ..CaptionConfig::default()
            },
        };
        assert!(config.validate().unwrap_err().contains("Fixed font size"));

        let mut boxed = caption_box("Hello");
        boxed.font_size = FontSizePolicy::Proportional {
            minimum: MAX_FONT_SIZE + 1.0,
            fraction: 0.025,
        };
        let config = OverlayConfig::CaptionBoxLogo {
            caption_box: boxed,
            logo: LogoConfig::default(),
        };
        assert!(config.validate().unwrap_err().contains("minimum"));
    }

    #[test]
    fn test_validate_stroke_width_and_padding() {
        let config = OverlayConfig::BannerCaption {
            banner: BannerConfig::default(),
            caption: CaptionConfig {
                stroke_width: 10_000,
                ..CaptionConfig::default()
            },
        };
        assert!(config.validate().unwrap_err().contains("stroke_width"));

        let mut boxed = caption_box("Hello");
        boxed.padding = u32::MAX;
        let config = OverlayConfig::CaptionBoxLogo {
            caption_box: boxed,
            logo: LogoConfig::default(),
        };
        assert!(config.validate().unwrap_err().contains("padding"));
    }

    #[test]
    fn test_validate_box_opacity() {
        let mut boxed = caption_box("Hello");
        boxed.box_opacity = 1.5;
        let config = OverlayConfig::CaptionBoxLogo {
            caption_box: boxed,
            logo: LogoConfig::default(),
        };
        assert!(config.validate().unwrap_err().contains("opacity"));
    }

    #[test]
    fn test_validate_logo_fractions() {
        let config = OverlayConfig::CaptionBoxLogo {
            caption_box: caption_box("Hello"),
            logo: LogoConfig {
                width_fraction: 0.0,
                ..LogoConfig::default()
            },
        };
        assert!(config.validate().unwrap_err().contains("width_fraction"));

        let config = OverlayConfig::CaptionBoxLogo {
            caption_box: caption_box("Hello"),
            logo: LogoConfig {
                margin_fraction: -0.1,
                ..LogoConfig::default()
            },
        };
        assert!(config.validate().unwrap_err().contains("margin_fraction"));
    }

    #[test]
    fn test_validate_empty_banner_path() {
        let config = OverlayConfig::BannerOnly {
            banner: BannerConfig {
                path: PathBuf::new(),
            },
        };
        assert!(config.validate().unwrap_err().contains("banner path"));
    }

    #[test]
    fn test_caption_style_accessors() {
        let config = OverlayConfig::CaptionBoxLogo {
            caption_box: caption_box("Line one\nLine two"),
            logo: LogoConfig::default(),
        };
        let style = config.caption().unwrap();
        assert!(style.font_path().is_none());
        assert_eq!(style.font_size().resolve(1000), 25.0);
    }
}
