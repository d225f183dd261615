use std::ops::Deref;

use crate::font::FontHandle;
use crate::layout::{DeviceContext, LayoutService, ShapedLayout};
use crate::unicode::step;

/// Caret x-coordinate for every byte of a line.
///
/// Entry `i` is the trailing edge of the character that byte `i` belongs
/// to, so all bytes of one character share a value and the table never
/// decreases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionTable {
    positions: Vec<f32>,
}

impl PositionTable {
    pub fn as_slice(&self) -> &[f32] {
        &self.positions
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.positions
    }

    /// Trailing edge of the character containing `byte`.
    pub fn x_at(&self, byte: usize) -> Option<f32> {
        self.positions.get(byte).copied()
    }

    /// Width of the whole line (0 for an empty line).
    pub fn width(&self) -> f32 {
        self.positions.last().copied().unwrap_or(0.0)
    }

    /// Byte offset of the character boundary closest to `x`. Ties go to
    /// the earlier boundary.
    pub fn hit_test(&self, x: f32) -> usize {
        let mut best = 0usize;
        let mut best_distance = x.abs();
        for (i, &pos) in self.positions.iter().enumerate() {
            let ends_character = self.positions.get(i + 1).is_none_or(|&next| next != pos);
            if !ends_character {
                continue;
            }
            let distance = (x - pos).abs();
            if distance < best_distance {
                best = i + 1;
                best_distance = distance;
            }
        }
        best
    }
}

impl Deref for PositionTable {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.positions
    }
}

/// Measure the caret position after every byte of `line`.
///
/// Never fails: malformed UTF-8 is decoded lossily and any bytes the walk
/// cannot attribute to a character repeat the last computed position
/// (0 if none), and a null font yields an all-zero table.
pub fn measure(
    line: &[u8],
    font: &FontHandle,
    service: &dyn LayoutService,
    device: &DeviceContext,
) -> PositionTable {
    if line.is_empty() {
        return PositionTable::default();
    }

    let Some(params) = font.parameters() else {
        tracing::warn!(len = line.len(), "measuring with a released font");
        return PositionTable {
            positions: vec![0.0; line.len()],
        };
    };

    let text = String::from_utf8_lossy(line);
    let Some(layout) = service.shape(&text, params, device) else {
        tracing::warn!(family = %params.family, "layout service could not shape line");
        return PositionTable {
            positions: vec![0.0; line.len()],
        };
    };

    PositionTable {
        positions: walk(line, layout.as_ref()),
    }
}

fn walk(line: &[u8], layout: &dyn ShapedLayout) -> Vec<f32> {
    let len = line.len();
    let available = layout.code_units();
    let mut positions = Vec::with_capacity(len);
    let mut unit = 0usize;
    let mut last = 0.0f32;

    while unit < available && positions.len() < len {
        let byte = positions.len();
        let seq = step(line[byte]);
        // A sequence cut off by the end of the line is not a character.
        if byte + seq.bytes > len {
            break;
        }
        let x = layout.cursor_to_x(unit + seq.units).max(last);
        positions.resize(byte + seq.bytes, x);
        last = x;
        unit += seq.units;
    }

    positions.resize(len, last);
    positions
}
