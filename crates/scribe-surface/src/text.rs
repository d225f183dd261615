//! Compositing glyph coverage masks onto a pixmap.

use scribe_text::layout::GlyphMask;
use tiny_skia::{IntSize, Mask, Pixmap, PixmapPaint, Transform};

use crate::paint::Colour;

/// Coverage below this is dropped, and at or above it is solid, when text
/// is drawn without antialiasing.
const ALIASED_THRESHOLD: u8 = 128;

/// Paint `glyphs` in `colour` with their pen origin at (`x`, `baseline`).
pub(crate) fn composite_glyphs(
    pixmap: &mut Pixmap,
    glyphs: &[GlyphMask],
    x: f32,
    baseline: f32,
    colour: Colour,
    antialias: bool,
    clip: Option<&Mask>,
) {
    let origin_x = x.round() as i32;
    let origin_y = baseline.round() as i32;
    for glyph in glyphs {
        let Some(tile) = tint(glyph, colour, antialias) else {
            continue;
        };
        pixmap.draw_pixmap(
            origin_x + glyph.left,
            origin_y + glyph.top,
            tile.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            clip,
        );
    }
}

/// Premultiplied pixmap of `colour` with the glyph's coverage as alpha.
fn tint(glyph: &GlyphMask, colour: Colour, antialias: bool) -> Option<Pixmap> {
    let size = IntSize::from_wh(glyph.width, glyph.height)?;
    if glyph.coverage.len() < size.width() as usize * size.height() as usize {
        return None;
    }

    let mut data = Vec::with_capacity(glyph.coverage.len() * 4);
    for &coverage in &glyph.coverage {
        let alpha = match antialias {
            true => coverage,
            false if coverage >= ALIASED_THRESHOLD => u8::MAX,
            false => 0,
        };
        data.extend_from_slice(&[
            premultiply(colour.r, alpha),
            premultiply(colour.g, alpha),
            premultiply(colour.b, alpha),
            alpha,
        ]);
    }
    Pixmap::from_vec(data, size)
}

pub(crate) fn premultiply(channel: u8, alpha: u8) -> u8 {
    let prod = (channel as u16) * (alpha as u16) + 127;
    ((prod + (prod >> 8)) >> 8) as u8
}
