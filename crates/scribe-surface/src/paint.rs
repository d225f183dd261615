//! Colours and the lazily created paint context.

use tiny_skia::{Color, LineCap, Mask, Paint, Stroke};

use crate::geometry::Point;

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const WHITE: Colour = Colour::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From the editor's packed `0xBBGGRR` form.
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            r: (packed & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: ((packed >> 16) & 0xFF) as u8,
        }
    }

    pub const fn packed(self) -> u32 {
        self.r as u32 | (self.g as u32) << 8 | (self.b as u32) << 16
    }

    pub fn with_alpha(self, alpha: u8) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, alpha)
    }
}

/// One-pixel, flat-capped pen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub colour: Colour,
    pub width: f32,
}

impl Pen {
    pub fn new(colour: Colour) -> Self {
        Self { colour, width: 1.0 }
    }

    pub fn stroke(&self) -> Stroke {
        Stroke {
            width: self.width,
            line_cap: LineCap::Butt,
            ..Stroke::default()
        }
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(Colour::BLACK)
    }
}

/// Paint resources of one drawing session: pen, brush, clip and the
/// text rendering baseline. Owned by the surface and dropped on release.
#[derive(Clone)]
pub struct PaintContext {
    pub pen: Pen,
    pub brush: Colour,
    pub clip: Option<Mask>,
    /// Antialiased text unless the font asks otherwise.
    pub text_antialias: bool,
}

impl PaintContext {
    pub fn new() -> Self {
        Self {
            pen: Pen::default(),
            brush: Colour::WHITE,
            clip: None,
            text_antialias: true,
        }
    }

    /// Back to the default pen and brush; the clip is left alone.
    pub fn reset_pen_and_brush(&mut self) {
        self.pen = Pen::default();
        self.brush = Colour::WHITE;
    }

    pub fn pen_paint(&self) -> Paint<'static> {
        solid_paint(self.pen.colour, u8::MAX)
    }

    pub fn brush_paint(&self) -> Paint<'static> {
        solid_paint(self.brush, u8::MAX)
    }
}

impl std::fmt::Debug for PaintContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintContext")
            .field("pen", &self.pen)
            .field("brush", &self.brush)
            .field("clipped", &self.clip.is_some())
            .field("text_antialias", &self.text_antialias)
            .finish()
    }
}

impl Default for PaintContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Aliased solid paint; shapes land on whole pixels.
pub fn solid_paint(colour: Colour, alpha: u8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(colour.with_alpha(alpha));
    paint.anti_alias = false;
    paint
}

/// Centre of the pixel whose top-left corner is `p`; strokes along pixel
/// centres fill whole pixels.
pub(crate) fn pixel_centre(p: Point) -> Point {
    Point::new(p.x + 0.5, p.y + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_colour_is_bgr() {
        let colour = Colour::from_packed(0x00_33_22_11);
        assert_eq!(colour, Colour::rgb(0x11, 0x22, 0x33));
        assert_eq!(colour.packed(), 0x33_22_11);
    }

    #[test]
    fn fresh_context_antialiases_text() {
        let mut paint = PaintContext::new();
        assert!(paint.text_antialias);
        paint.pen = Pen::new(Colour::rgb(1, 2, 3));
        paint.brush = Colour::BLACK;
        paint.reset_pen_and_brush();
        assert_eq!(paint.pen, Pen::default());
        assert_eq!(paint.brush, Colour::WHITE);
    }

    #[test]
    fn pen_is_flat_capped() {
        let stroke = Pen::default().stroke();
        assert_eq!(stroke.width, 1.0);
        assert_eq!(stroke.line_cap, LineCap::Butt);
    }
}
