// Constants module - centralized default values for configuration
//
// Overlay geometry, upstream defaults and the fixed caller-facing messages
// live here so the config layer and the engine agree on them.

// =============================================================================
// Overlay asset defaults
// =============================================================================

/// Default banner file name, relative to the asset root
pub const DEFAULT_BANNER_PATH: &str = "bottom_banner.png";

/// Default logo file name, relative to the asset root
pub const DEFAULT_LOGO_PATH: &str = "logo.png";

// =============================================================================
// Caption defaults (banner + caption variant)
// =============================================================================

/// Default caption text
pub const DEFAULT_CAPTION_TEXT: &str = "Made Possible By Google";

/// Default caption point size
pub const DEFAULT_CAPTION_FONT_SIZE: f32 = 28.0;

/// Default distance of the caption from the right and bottom edges in pixels
pub const DEFAULT_CAPTION_MARGIN: u32 = 15;

/// Default stroke outline width in pixels
pub const DEFAULT_STROKE_WIDTH: u32 = 2;

/// Default caption fill colour
pub const DEFAULT_TEXT_COLOR: &str = "#FFFFFF";

/// Default caption stroke colour
pub const DEFAULT_STROKE_COLOR: &str = "#000000";

// =============================================================================
// Caption-box defaults (caption box + logo variant)
// =============================================================================

/// Smallest point size used for caption-box text
pub const DEFAULT_CAPTION_BOX_MIN_FONT_SIZE: f32 = 16.0;

/// Caption-box point size as a fraction of the image width
pub const DEFAULT_CAPTION_BOX_FONT_FRACTION: f32 = 0.025;

/// Default distance of the caption box from the left and bottom edges in pixels
pub const DEFAULT_CAPTION_BOX_MARGIN: u32 = 20;

/// Default padding between the text bounding box and the panel edge in pixels
pub const DEFAULT_CAPTION_BOX_PADDING: u32 = 10;

/// Default panel colour
pub const DEFAULT_CAPTION_BOX_COLOR: &str = "#000000";

/// Default panel opacity (0.0 transparent to 1.0 opaque)
pub const DEFAULT_CAPTION_BOX_OPACITY: f32 = 0.5;

/// Extra spacing between caption lines in pixels
pub const DEFAULT_LINE_SPACING: f32 = 4.0;

// =============================================================================
// Rendering limits
// =============================================================================

/// Largest caption point size accepted by configuration
pub const MAX_FONT_SIZE: f32 = 512.0;

/// Largest caption stroke width in pixels
pub const MAX_STROKE_WIDTH: u32 = 64;

/// Largest caption box padding in pixels
pub const MAX_CAPTION_BOX_PADDING: u32 = 1024;

/// Upper bound on the pixel area of a rendered caption (4096 x 4096)
pub const MAX_TEXT_CANVAS_PIXELS: u64 = 16_777_216;

// =============================================================================
// Logo defaults
// =============================================================================

/// Logo width as a fraction of the image width
pub const DEFAULT_LOGO_WIDTH_FRACTION: f32 = 0.15;

/// Logo margin as a fraction of the image width
pub const DEFAULT_LOGO_MARGIN_FRACTION: f32 = 0.02;

// =============================================================================
// Upstream defaults
// =============================================================================

/// Default generation API base URL
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default image generation model
pub const DEFAULT_UPSTREAM_MODEL: &str = "gemini-3-pro-image-preview";

/// Default upstream request timeout in seconds
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// MIME type of every rewritten inline image
pub const OUTPUT_MIME_TYPE: &str = "image/png";

/// Status used when the upstream call fails without an HTTP response
pub const UPSTREAM_FAILURE_STATUS: u16 = 502;

// =============================================================================
// Caller-facing messages
// =============================================================================

/// Returned with 500 when no API key can be obtained
pub const MSG_API_KEY_UNAVAILABLE: &str = "Server configuration error: unable to read API key.";

/// Returned with 400 when the request body is missing or empty
pub const MSG_INVALID_PAYLOAD: &str = "Invalid request body.";

/// Returned when branding the generated image could not complete
pub const MSG_INTERNAL_ERROR: &str = "Internal server error.";

/// Returned when the upstream generation call fails
pub const MSG_UPSTREAM_UNAVAILABLE: &str = "Due to high traffic, the server is temporarily unavailable, please try later. <br>Please also follow our generation guidance <a href=\"https://policies.google.com/terms/generative-ai/use-policy?hl=en\" target=\"_blank\" class=\"underline text-white\">here</a> to avoid failure.";

// =============================================================================
// Service defaults
// =============================================================================

/// Default asset root when none is configured
pub const DEFAULT_ASSET_ROOT: &str = ".";

/// Default log level filter
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default configuration file path for the CLI
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Number of most recent composition durations kept for percentiles
pub const MAX_DURATION_SAMPLES: usize = 4096;
