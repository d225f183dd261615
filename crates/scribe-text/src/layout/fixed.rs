//! Deterministic layout service with a constant advance per code unit.
//!
//! Used wherever measurements must not depend on installed fonts: headless
//! platforms, tests, and demos.

use crate::font::{DeviceFontMetrics, FontParameters};
use crate::layout::{DeviceContext, GlyphMask, LayoutService, ShapedLayout};

/// Share of the pixel size above the baseline.
const ASCENT_RATIO: f32 = 0.8;

#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceService {
    advance: f32,
}

impl FixedAdvanceService {
    /// Every UTF-16 code unit advances by `advance` pixels, so an astral
    /// character is two advances wide.
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }

    pub fn advance(&self) -> f32 {
        self.advance
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceLayout {
    code_units: usize,
    advance: f32,
}

impl ShapedLayout for FixedAdvanceLayout {
    fn code_units(&self) -> usize {
        self.code_units
    }

    fn cursor_to_x(&self, code_units: usize) -> f32 {
        code_units.min(self.code_units) as f32 * self.advance
    }
}

impl LayoutService for FixedAdvanceService {
    fn shape(
        &self,
        text: &str,
        _font: &FontParameters,
        _device: &DeviceContext,
    ) -> Option<Box<dyn ShapedLayout>> {
        Some(Box::new(FixedAdvanceLayout {
            code_units: text.encode_utf16().count(),
            advance: self.advance,
        }))
    }

    fn font_metrics(
        &self,
        font: &FontParameters,
        device: &DeviceContext,
    ) -> Option<DeviceFontMetrics> {
        let px = font.pixel_size(device.logical_dpi);
        let ascent = px * ASCENT_RATIO;
        let descent = px - ascent;
        Some(DeviceFontMetrics {
            ascent,
            descent,
            internal_leading: 0.0,
            external_leading: 0.0,
            height: ascent + descent,
            average_char_width: self.advance,
        })
    }

    /// One solid box per visible character, sitting on the baseline.
    fn rasterize(&self, text: &str, font: &FontParameters, device: &DeviceContext) -> Vec<GlyphMask> {
        let height = (font.pixel_size(device.logical_dpi) * ASCENT_RATIO).round().max(1.0) as u32;
        let mut masks = Vec::new();
        let mut units = 0usize;
        for ch in text.chars() {
            let left = (units as f32 * self.advance).round() as i32;
            units += ch.len_utf16();
            let right = (units as f32 * self.advance).round() as i32;
            let width = (right - left).max(0) as u32;
            if ch.is_whitespace() || width == 0 {
                continue;
            }
            masks.push(GlyphMask {
                left,
                top: -(height as i32),
                width,
                height,
                coverage: vec![u8::MAX; (width * height) as usize],
            });
        }
        masks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FontParameters {
        // 12pt at 96 dpi is 16px.
        FontParameters::new("Reference", 12.0)
    }

    #[test]
    fn astral_characters_take_two_advances() {
        let service = FixedAdvanceService::new(5.0);
        let layout = service
            .shape("a😀b", &params(), &DeviceContext::default())
            .unwrap();
        assert_eq!(layout.code_units(), 4);
        assert_eq!(layout.cursor_to_x(1), 5.0);
        assert_eq!(layout.cursor_to_x(3), 15.0);
        assert_eq!(layout.cursor_to_x(10), 20.0);
        assert_eq!(layout.width(), 20.0);
    }

    #[test]
    fn metrics_follow_pixel_size() {
        let service = FixedAdvanceService::new(7.0);
        let metrics = service
            .font_metrics(&params(), &DeviceContext::default())
            .unwrap();
        assert!((metrics.ascent - 12.8).abs() < 1e-4);
        assert!((metrics.descent - 3.2).abs() < 1e-4);
        assert!((metrics.height - 16.0).abs() < 1e-4);
        assert_eq!(metrics.average_char_width, 7.0);
    }

    #[test]
    fn rasterize_skips_whitespace() {
        let service = FixedAdvanceService::new(4.0);
        let masks = service.rasterize("a b", &params(), &DeviceContext::default());
        assert_eq!(masks.len(), 2);
        assert_eq!(masks[0].left, 0);
        assert_eq!(masks[1].left, 8);
        assert_eq!(masks[1].top, -13);
        assert_eq!(masks[1].coverage.len(), 4 * 13);
    }
}
