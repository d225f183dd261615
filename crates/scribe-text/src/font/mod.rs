pub mod default;
pub mod face;
pub mod handle;
pub mod library;
pub mod metrics;

pub use default::{
    DefaultFont, FALLBACK_FAMILY, FALLBACK_SIZE_POINTS, default_font, init_default_font,
};
pub use face::FontFace;
pub use handle::{AntialiasMode, BOLD_THRESHOLD, FontHandle, FontParameters, FontQuality};
pub use library::{FaceKey, FontLibrary};
pub use metrics::{DeviceFontMetrics, FontMetrics, ScaledFontMetrics};

/// Errors that can occur while working with fonts.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("invalid font data")]
    InvalidFont,

    #[error("no font face available for family {0:?}")]
    NoFace(String),
}

/// Convenient result alias for font-related operations.
pub type Result<T> = std::result::Result<T, FontError>;
