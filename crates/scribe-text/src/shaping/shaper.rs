use harfrust::{
    Direction as HbDirection,
    FontRef as HbFontRef,
    Script as HbScript,
    ShaperData,
    ShaperInstance,
    Tag as HbTag,
    UnicodeBuffer as HbUnicodeBuffer,
};
use swash::GlyphId;

use crate::font::{FontError, FontFace, Result};

use super::{GlyphPosition, ShapedRun};

/// Single-font, left-to-right text shaper built on harfrust (pure-Rust
/// HarfBuzz port). Kerning and ligatures follow HarfBuzz semantics.
pub struct TextShaper;

impl TextShaper {
    /// Shape a UTF-8 string with `font` at `font_size` pixels per em.
    ///
    /// Cluster values in the result are UTF-16 code unit offsets, matching
    /// how carets are addressed by [`ShapedLayout`](crate::layout::ShapedLayout).
    pub fn shape_ltr(text: &str, font: &FontFace, font_size: f32) -> Result<ShapedRun> {
        let font_data = font.as_bytes();
        let font_ref =
            HbFontRef::from_index(&font_data, font.index()).map_err(|_| FontError::InvalidFont)?;

        // Default (no variations) instance.
        let data = ShaperData::new(&font_ref);
        let instance =
            ShaperInstance::from_variations(&font_ref, core::iter::empty::<harfrust::Variation>());
        let shaper = data
            .shaper(&font_ref)
            .instance(Some(&instance))
            .point_size(None)
            .build();

        let mut buffer = HbUnicodeBuffer::new();
        buffer.push_str(text);
        buffer.set_direction(HbDirection::LeftToRight);
        let latin_tag = HbTag::new(b"Latn");
        if let Some(script) = HbScript::from_iso15924_tag(latin_tag) {
            buffer.set_script(script);
        }
        buffer.guess_segment_properties();

        let glyph_buffer = shaper.shape(buffer, &[]);
        let infos = glyph_buffer.glyph_infos();
        let positions = glyph_buffer.glyph_positions();

        // harfrust clusters are UTF-8 byte offsets.
        let utf16_at_byte = utf16_offsets(text);

        let mut glyphs = Vec::with_capacity(infos.len());
        let mut glyph_positions = Vec::with_capacity(infos.len());
        let mut advances = Vec::with_capacity(infos.len());
        let mut clusters = Vec::with_capacity(infos.len());

        // harfrust works in design units.
        let metrics = font.metrics();
        let scale = if metrics.units_per_em != 0 {
            font_size / metrics.units_per_em as f32
        } else {
            1.0
        };

        let mut pen_x: f32 = 0.0;
        for (info, pos) in infos.iter().zip(positions.iter()) {
            let x_advance = pos.x_advance as f32 * scale;
            let x_offset = pos.x_offset as f32 * scale;
            let y_offset = -(pos.y_offset as f32) * scale;

            glyphs.push(info.glyph_id as GlyphId);
            glyph_positions.push(GlyphPosition {
                x_offset: pen_x + x_offset,
                y_offset,
            });
            advances.push(x_advance);
            let byte = (info.cluster as usize).min(text.len());
            clusters.push(utf16_at_byte[byte]);

            pen_x += x_advance;
        }

        Ok(ShapedRun {
            font_size,
            glyphs,
            positions: glyph_positions,
            advances,
            clusters,
            code_units: utf16_at_byte[text.len()] as usize,
            width: pen_x,
        })
    }
}

/// UTF-16 offset of every byte position in `text`; bytes inside a
/// character map to that character's start. `len == text.len() + 1`.
fn utf16_offsets(text: &str) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(text.len() + 1);
    let mut units = 0u32;
    for ch in text.chars() {
        for _ in 0..ch.len_utf8() {
            offsets.push(units);
        }
        units += ch.len_utf16() as u32;
    }
    offsets.push(units);
    offsets
}
