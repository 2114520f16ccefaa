//! Image composition engine.
//!
//! Stamps a fixed brand overlay onto images returned by the generation API.
//! The overlay variant is chosen once per deployment and never changes the
//! canvas size.
//!
//! # Features
//!
//! - **Banner** scaled to the full image width and affixed to the bottom edge
//! - **Caption** text, either stroked (bottom-right) or on a translucent panel
//!   (bottom-left), with a built-in fallback font
//! - **Logo** scaled to a fraction of the image width at the bottom-right
//! - **Degrade-and-continue**: a missing asset skips its step, an undecodable
//!   input comes back unchanged
//!
//! # Configuration Example
//!
//! ```yaml
//! assets:
//!   root: /srv/brandgen/assets
//! overlay:
//!   variant: caption-box-logo
//!   caption_box:
//!     text: "Generated with AI\nHong Kong"
//!   logo:
//!     path: logo.png
//!     width_fraction: 0.15
//! ```

pub mod assets;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod position;
pub mod text_renderer;

// Re-export main types for convenience
pub use assets::AssetRoot;
pub use compositor::{BlendMode, Compositor, OverlayLayer};
pub use config::{
    BannerConfig, CaptionBoxConfig, CaptionConfig, CaptionStyle, FontSizePolicy, LogoConfig,
    OverlayConfig,
};
pub use engine::{
    apply_overlay, compose, compose_bytes, ComposeReport, ComposeStep, Composer, Composition,
    StepOutcome,
};
pub use error::ComposeError;
pub use position::{calculate_position, scale_to_width, Anchor, ImageDimensions, PlacementPosition};
pub use text_renderer::{builtin_font, load_font, measure_text, parse_hex_color, render_text};
