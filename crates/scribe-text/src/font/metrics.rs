/// Font-level metrics in font units.
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    /// Ascent above baseline (positive).
    pub ascent: f32,
    /// Descent below baseline (positive).
    pub descent: f32,
    /// Line gap (leading).
    pub line_gap: f32,
    /// Average character width (OS/2 `xAvgCharWidth`); zero when absent.
    pub average_width: f32,
    /// Units per em.
    pub units_per_em: u16,
}

impl FontMetrics {
    /// Calculate line height (ascent + descent + line_gap).
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent + self.line_gap
    }

    /// Scale metrics to pixel size, where `font_size` is in pixels per em.
    pub fn scale_to_pixels(&self, font_size: f32) -> ScaledFontMetrics {
        let scale = if self.units_per_em != 0 {
            font_size / self.units_per_em as f32
        } else {
            1.0
        };
        ScaledFontMetrics {
            ascent: self.ascent * scale,
            descent: self.descent * scale,
            line_gap: self.line_gap * scale,
            average_width: self.average_width * scale,
            font_size,
        }
    }

    /// Scale metrics for a font size specified in points at a given DPI.
    ///
    /// `px = pt * dpi / 72.0`.
    pub fn scale_from_points(&self, font_size_pt: f32, dpi: f32) -> ScaledFontMetrics {
        self.scale_to_pixels(points_to_pixels(font_size_pt, dpi))
    }
}

/// Convert a point size to pixels per em at `dpi`.
pub fn points_to_pixels(points: f32, dpi: f32) -> f32 {
    points * dpi / 72.0
}

/// Scaled font metrics in pixels.
#[derive(Debug, Clone, Copy)]
pub struct ScaledFontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
    pub average_width: f32,
    pub font_size: f32,
}

/// Metrics of a font evaluated against one device, as reported by a
/// layout service. All values are in device pixels.
///
/// These are the raw service values; drawing surfaces apply their own
/// compensations on top.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceFontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub internal_leading: f32,
    pub external_leading: f32,
    /// Full line height (ascent + descent).
    pub height: f32,
    pub average_char_width: f32,
}
