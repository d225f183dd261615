//! Process-wide default font.
//!
//! Computed at most once and never torn down: either set explicitly with
//! [`init_default_font`] during startup or derived from the installed
//! fonts on the first call to [`default_font`].

use std::sync::OnceLock;

use crate::font::{FontLibrary, FontParameters};

/// Family used when no sans-serif face can be discovered.
pub const FALLBACK_FAMILY: &str = "sans-serif";
/// Point size used when the host does not configure one.
pub const FALLBACK_SIZE_POINTS: f32 = 10.0;

static DEFAULT_FONT: OnceLock<DefaultFont> = OnceLock::new();

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultFont {
    pub family: String,
    pub size_points: f32,
}

impl DefaultFont {
    pub fn new(family: impl Into<String>, size_points: f32) -> Self {
        Self {
            family: family.into(),
            size_points,
        }
    }

    /// Derive the default from the installed sans-serif family.
    pub fn from_system() -> Self {
        let family = FontLibrary::with_system_fonts()
            .sans_serif_family()
            .unwrap_or_else(|| FALLBACK_FAMILY.to_string());
        Self::new(family, FALLBACK_SIZE_POINTS)
    }

    pub fn parameters(&self) -> FontParameters {
        FontParameters::new(self.family.clone(), self.size_points)
    }
}

/// Install the process-wide default. Only the first call succeeds; later
/// calls hand their value back unchanged.
pub fn init_default_font(font: DefaultFont) -> Result<(), DefaultFont> {
    DEFAULT_FONT.set(font)
}

/// The process-wide default, initialising it from the system on first use.
pub fn default_font() -> &'static DefaultFont {
    DEFAULT_FONT.get_or_init(|| {
        let font = DefaultFont::from_system();
        tracing::debug!(family = %font.family, size = font.size_points, "default font resolved");
        font
    })
}
