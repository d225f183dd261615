use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use swash::GlyphId;
use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};

use crate::font::{DeviceFontMetrics, FontFace, FontLibrary, FontParameters};
use crate::layout::{DeviceContext, GlyphMask, LayoutService, ShapedLayout};
use crate::shaping::{ShapedRun, TextShaper};

/// A shaped line answering caret queries from its cluster map.
#[derive(Debug, Clone, Default)]
pub struct ShapedLine {
    stops: Vec<f32>,
}

impl ShapedLine {
    pub fn new(run: &ShapedRun) -> Self {
        Self {
            stops: run.caret_stops(),
        }
    }
}

impl ShapedLayout for ShapedLine {
    fn code_units(&self) -> usize {
        self.stops.len().saturating_sub(1)
    }

    fn cursor_to_x(&self, code_units: usize) -> f32 {
        let last = self.stops.len().saturating_sub(1);
        self.stops.get(code_units.min(last)).copied().unwrap_or(0.0)
    }
}

/// Layout service backed by installed fonts: fontdb resolves families,
/// harfrust shapes, swash supplies metrics and glyph coverage.
pub struct SystemLayoutService {
    library: Mutex<FontLibrary>,
    /// Reused across paints so swash keeps its outline and hinting caches.
    scale: Mutex<ScaleContext>,
}

impl SystemLayoutService {
    pub fn new(library: FontLibrary) -> Self {
        Self {
            library: Mutex::new(library),
            scale: Mutex::new(ScaleContext::new()),
        }
    }

    fn library(&self) -> MutexGuard<'_, FontLibrary> {
        // The library only caches faces, so a poisoned lock holds nothing
        // half-written worth refusing.
        self.library
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn scale_context(&self) -> MutexGuard<'_, ScaleContext> {
        self.scale
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn face(&self, font: &FontParameters) -> Option<Arc<FontFace>> {
        match self.library().resolve(font) {
            Ok(face) => Some(face),
            Err(err) => {
                tracing::warn!(family = %font.family, error = %err, "font resolution failed");
                None
            }
        }
    }

    fn shape_run(&self, text: &str, font: &FontParameters, device: &DeviceContext) -> Option<ShapedRun> {
        let face = self.face(font)?;
        let size = font.pixel_size(device.logical_dpi).max(1.0);
        match TextShaper::shape_ltr(text, &face, size) {
            Ok(run) => Some(run),
            Err(err) => {
                tracing::warn!(family = %font.family, error = %err, "shaping failed");
                None
            }
        }
    }
}

impl fmt::Debug for SystemLayoutService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemLayoutService")
            .field("faces", &self.library().len())
            .finish_non_exhaustive()
    }
}

impl Default for SystemLayoutService {
    fn default() -> Self {
        Self::new(FontLibrary::with_system_fonts())
    }
}

impl LayoutService for SystemLayoutService {
    fn shape(
        &self,
        text: &str,
        font: &FontParameters,
        device: &DeviceContext,
    ) -> Option<Box<dyn ShapedLayout>> {
        let run = self.shape_run(text, font, device)?;
        Some(Box::new(ShapedLine::new(&run)))
    }

    fn font_metrics(
        &self,
        font: &FontParameters,
        device: &DeviceContext,
    ) -> Option<DeviceFontMetrics> {
        let face = self.face(font)?;
        let scaled = face.scaled_metrics_from_points(font.size_points, device.logical_dpi);

        // Fonts without OS/2 xAvgCharWidth fall back to the width of "x".
        let average_char_width = if scaled.average_width > 0.0 {
            scaled.average_width
        } else {
            TextShaper::shape_ltr("x", &face, scaled.font_size.max(1.0))
                .map(|run| run.width)
                .unwrap_or(0.0)
        };

        Some(DeviceFontMetrics {
            ascent: scaled.ascent,
            descent: scaled.descent,
            internal_leading: 0.0,
            external_leading: scaled.line_gap,
            height: scaled.ascent + scaled.descent,
            average_char_width,
        })
    }

    fn rasterize(&self, text: &str, font: &FontParameters, device: &DeviceContext) -> Vec<GlyphMask> {
        let Some(face) = self.face(font) else {
            return Vec::new();
        };
        let size = font.pixel_size(device.logical_dpi).max(1.0);
        let run = match TextShaper::shape_ltr(text, &face, size) {
            Ok(run) => run,
            Err(err) => {
                tracing::warn!(family = %font.family, error = %err, "shaping failed");
                return Vec::new();
            }
        };

        let mut ctx = self.scale_context();
        let mut scaler = ctx.builder(face.as_swash_ref()).size(size).hint(true).build();
        let renderer = Render::new(&[
            Source::Outline,
            Source::Bitmap(StrikeWith::BestFit),
            Source::ColorBitmap(StrikeWith::BestFit),
        ]);

        let mut masks = Vec::with_capacity(run.glyphs.len());
        for (&glyph, pos) in run.glyphs.iter().zip(run.positions.iter()) {
            let glyph: GlyphId = glyph;
            let Some(image) = renderer.render(&mut scaler, glyph) else {
                continue;
            };
            let (width, height) = (image.placement.width, image.placement.height);
            if width == 0 || height == 0 {
                continue;
            }

            let coverage = match image.content {
                Content::Mask => image.data,
                // Colour and subpixel images are RGBA; keep one coverage channel.
                Content::Color => image.data.chunks_exact(4).map(|px| px[3]).collect(),
                Content::SubpixelMask => image
                    .data
                    .chunks_exact(4)
                    .map(|px| px[0].max(px[1]).max(px[2]))
                    .collect(),
            };

            masks.push(GlyphMask {
                left: (pos.x_offset + image.placement.left as f32).round() as i32,
                top: (pos.y_offset - image.placement.top as f32).round() as i32,
                width,
                height,
                coverage,
            });
        }
        masks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaping::GlyphPosition;

    #[test]
    fn shaped_line_clamps_past_the_end() {
        let run = ShapedRun {
            font_size: 10.0,
            glyphs: vec![1, 2],
            positions: vec![GlyphPosition::default(); 2],
            advances: vec![4.0, 6.0],
            clusters: vec![0, 1],
            code_units: 2,
            width: 10.0,
        };
        let line = ShapedLine::new(&run);
        assert_eq!(line.code_units(), 2);
        assert_eq!(line.cursor_to_x(0), 0.0);
        assert_eq!(line.cursor_to_x(1), 4.0);
        assert_eq!(line.cursor_to_x(2), 10.0);
        assert_eq!(line.cursor_to_x(9), 10.0);
        assert_eq!(line.width(), 10.0);
    }

    #[test]
    fn empty_library_shapes_nothing() {
        let service = SystemLayoutService::new(FontLibrary::new());
        let font = FontParameters::new("Missing", 10.0);
        let device = DeviceContext::default();
        assert!(service.shape("abc", &font, &device).is_none());
        assert!(service.font_metrics(&font, &device).is_none());
        assert!(service.rasterize("abc", &font, &device).is_empty());
    }

    #[test]
    fn scale_context_survives_a_poisoned_lock() {
        let service = SystemLayoutService::new(FontLibrary::new());
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = service.scale.lock();
                    panic!("painter thread died");
                })
                .join();
        });
        assert!(service.scale.is_poisoned());

        let font = FontParameters::new("Missing", 10.0);
        let device = DeviceContext::default();
        for _ in 0..2 {
            assert!(service.rasterize("abc", &font, &device).is_empty());
        }
        drop(service.scale_context());
        assert!(format!("{service:?}").starts_with("SystemLayoutService"));
    }
}
