//! Layout service contract and the byte-offset position map built on it.
//!
//! A [`LayoutService`] turns a string plus a font into a [`ShapedLayout`]
//! that answers "x-coordinate after N code units" queries, and reports
//! font metrics and glyph coverage for a device. [`measure`] walks a
//! line's UTF-8 bytes against such a layout to produce a [`PositionTable`].

pub mod fixed;
pub mod position_map;
pub mod service;

pub use fixed::{FixedAdvanceLayout, FixedAdvanceService};
pub use position_map::{PositionTable, measure};
pub use service::{ShapedLine, SystemLayoutService};

use crate::font::{DeviceFontMetrics, FontParameters};

/// Logical DPI assumed when a device does not report one.
pub const DEFAULT_DPI: f32 = 96.0;

/// Resolution context a layout or metric query is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceContext {
    pub logical_dpi: f32,
}

impl DeviceContext {
    pub fn new(logical_dpi: f32) -> Self {
        let logical_dpi = if logical_dpi.is_finite() && logical_dpi > 0.0 {
            logical_dpi
        } else {
            DEFAULT_DPI
        };
        Self { logical_dpi }
    }
}

impl Default for DeviceContext {
    fn default() -> Self {
        Self {
            logical_dpi: DEFAULT_DPI,
        }
    }
}

/// One line of text shaped by a [`LayoutService`].
pub trait ShapedLayout {
    /// Length of the shaped text in UTF-16 code units.
    fn code_units(&self) -> usize;

    /// X-coordinate of the caret after the first `code_units` units.
    /// Offsets past the end clamp to the end of the line.
    fn cursor_to_x(&self, code_units: usize) -> f32;

    /// Total advance of the line.
    fn width(&self) -> f32 {
        self.cursor_to_x(self.code_units())
    }
}

/// Coverage mask for one glyph, placed relative to the pen origin on the
/// baseline (y grows downward, so `top` is usually negative).
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMask {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    /// `width * height` coverage values, row-major.
    pub coverage: Vec<u8>,
}

/// Platform text-shaping service.
///
/// Implementations are shared between surfaces and must give the same
/// answers for the same (text, font, device) triple.
pub trait LayoutService: Send + Sync {
    /// Shape `text`, or `None` when no face can render `font`.
    fn shape(
        &self,
        text: &str,
        font: &FontParameters,
        device: &DeviceContext,
    ) -> Option<Box<dyn ShapedLayout>>;

    /// Raw metrics of `font` on `device`.
    fn font_metrics(&self, font: &FontParameters, device: &DeviceContext)
    -> Option<DeviceFontMetrics>;

    /// Glyph coverage masks for `text`, positioned from the pen origin.
    fn rasterize(&self, text: &str, font: &FontParameters, device: &DeviceContext)
    -> Vec<GlyphMask>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_context_rejects_unusable_dpi() {
        assert_eq!(DeviceContext::new(0.0).logical_dpi, DEFAULT_DPI);
        assert_eq!(DeviceContext::new(f32::NAN).logical_dpi, DEFAULT_DPI);
        assert_eq!(DeviceContext::new(144.0).logical_dpi, 144.0);
    }
}
