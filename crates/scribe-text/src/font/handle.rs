//! Reference-counted font descriptions shared by measurement and drawing.

use std::sync::Arc;

use crate::font::metrics::points_to_pixels;

/// Weights strictly above this value (on a 0..=1000 scale) render bold.
pub const BOLD_THRESHOLD: u16 = 500;

/// Rendering strategy requested from the shaping engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AntialiasMode {
    /// Never antialias glyph edges.
    None,
    /// Antialias whenever the engine can.
    Prefer,
    /// Leave the decision to the engine and the paint context.
    #[default]
    Default,
}

/// Editor-facing font quality setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontQuality {
    #[default]
    Default,
    NonAntialiased,
    Antialiased,
    LcdOptimized,
}

impl From<FontQuality> for AntialiasMode {
    fn from(quality: FontQuality) -> Self {
        match quality {
            FontQuality::NonAntialiased => AntialiasMode::None,
            FontQuality::Antialiased | FontQuality::LcdOptimized => AntialiasMode::Prefer,
            FontQuality::Default => AntialiasMode::Default,
        }
    }
}

/// Style description a [`FontHandle`] is created from.
#[derive(Debug, Clone, PartialEq)]
pub struct FontParameters {
    pub family: String,
    /// Size in points.
    pub size_points: f32,
    /// Weight on a 0..=1000 scale.
    pub weight: u16,
    pub italic: bool,
    pub antialias: AntialiasMode,
}

impl FontParameters {
    pub fn new(family: impl Into<String>, size_points: f32) -> Self {
        Self {
            family: family.into(),
            size_points,
            weight: 400,
            italic: false,
            antialias: AntialiasMode::Default,
        }
    }

    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_antialias(mut self, antialias: AntialiasMode) -> Self {
        self.antialias = antialias;
        self
    }

    pub fn with_quality(self, quality: FontQuality) -> Self {
        self.with_antialias(quality.into())
    }

    pub fn is_bold(&self) -> bool {
        self.weight > BOLD_THRESHOLD
    }

    /// Pixels per em when rendered on a device with the given logical DPI.
    pub fn pixel_size(&self, dpi: f32) -> f32 {
        points_to_pixels(self.size_points, dpi)
    }
}

/// Opaque, shareable handle to an immutable font description.
///
/// Cloning shares the description. [`release`](Self::release) drops this
/// handle's reference and leaves it null; releasing a null handle is a
/// no-op, and dropping a handle releases it.
#[derive(Debug, Clone, Default)]
pub struct FontHandle {
    style: Option<Arc<FontParameters>>,
}

impl FontHandle {
    /// Create a handle describing `params`.
    pub fn create(params: FontParameters) -> Self {
        Self {
            style: Some(Arc::new(params)),
        }
    }

    /// A handle that refers to no font.
    pub fn null() -> Self {
        Self::default()
    }

    /// Release the current description and describe `params` instead.
    pub fn replace(&mut self, params: FontParameters) {
        self.release();
        self.style = Some(Arc::new(params));
    }

    /// Drop this handle's reference to its description.
    pub fn release(&mut self) {
        self.style = None;
    }

    pub fn is_null(&self) -> bool {
        self.style.is_none()
    }

    /// The description, or `None` for a null/released handle.
    pub fn parameters(&self) -> Option<&FontParameters> {
        self.style.as_deref()
    }

    /// Whether both handles share the same description instance.
    pub fn ptr_eq(&self, other: &FontHandle) -> bool {
        match (&self.style, &other.style) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}
