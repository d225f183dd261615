use std::sync::Arc;

use swash::{FontRef, Metrics};

use crate::font::{FontError, FontMetrics, Result, ScaledFontMetrics};

/// Loaded font face backed by a font file (TTF/OTF/TTC).
///
/// Owns the font data so the same bytes can be handed to both the
/// shaper (harfrust) and the scaler (swash).
#[derive(Debug, Clone)]
pub struct FontFace {
    /// Full font data.
    data: Arc<[u8]>,
    /// Face index within a collection.
    index: u32,
    /// Offset to the table directory for this font.
    offset: u32,
    /// Cache key used internally by swash.
    key: swash::CacheKey,
    /// Extracted font metrics in font units.
    metrics: FontMetrics,
}

impl FontFace {
    /// Create a font face from raw bytes and a font index within the file.
    pub fn from_bytes(data: Arc<[u8]>, index: usize) -> Result<Self> {
        let font = FontRef::from_index(&data, index).ok_or(FontError::InvalidFont)?;
        let metrics = Self::metrics_from_swash(&font);
        let (offset, key) = (font.offset, font.key);
        Ok(Self {
            data,
            index: index as u32,
            offset,
            key,
            metrics,
        })
    }

    /// Create a font face from raw bytes owned by a `Vec<u8>`.
    pub fn from_vec(data: Vec<u8>, index: usize) -> Result<Self> {
        Self::from_bytes(Arc::from(data), index)
    }

    /// Raw font bytes, shared with the shaper.
    pub fn as_bytes(&self) -> Arc<[u8]> {
        self.data.clone()
    }

    /// Face index within the font file.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Return a transient `FontRef` for interacting with swash APIs.
    pub(crate) fn as_swash_ref(&self) -> FontRef<'_> {
        FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        }
    }

    fn metrics_from_swash(font: &FontRef<'_>) -> FontMetrics {
        // Default (no variation) coordinates.
        let Metrics {
            units_per_em,
            ascent,
            descent,
            leading,
            average_width,
            ..
        } = font.metrics(&[]);

        FontMetrics {
            ascent,
            descent,
            line_gap: leading,
            average_width,
            units_per_em,
        }
    }

    /// Font metrics in font units.
    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    /// Font metrics for a point size at a given DPI.
    pub fn scaled_metrics_from_points(&self, font_size_pt: f32, dpi: f32) -> ScaledFontMetrics {
        self.metrics.scale_from_points(font_size_pt, dpi)
    }
}
