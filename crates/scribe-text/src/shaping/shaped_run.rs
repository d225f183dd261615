use swash::GlyphId;

/// A run of text shaped with a single font, left to right.
#[derive(Debug, Clone, Default)]
pub struct ShapedRun {
    /// Font size in pixels.
    pub font_size: f32,
    /// Glyph IDs in logical order for this run.
    pub glyphs: Vec<GlyphId>,
    /// Glyph positions (pen x plus offsets).
    pub positions: Vec<GlyphPosition>,
    /// Glyph advances in pixels.
    pub advances: Vec<f32>,
    /// UTF-16 offset of the cluster each glyph belongs to. Several glyphs
    /// may share a cluster (ligatures, marks).
    pub clusters: Vec<u32>,
    /// Length of the source text in UTF-16 code units.
    pub code_units: usize,
    /// Total advance width of the run in pixels.
    pub width: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphPosition {
    pub x_offset: f32,
    pub y_offset: f32,
}

impl ShapedRun {
    /// Caret x-coordinate before every code unit, plus one trailing entry
    /// for the end of the run; `len == code_units + 1`.
    ///
    /// A cluster spanning several code units (a ligature, or a surrogate
    /// pair) has its advance divided evenly across them.
    pub fn caret_stops(&self) -> Vec<f32> {
        let mut stops = vec![0.0f32; self.code_units + 1];

        // (start unit, x at start, advance) per cluster, in logical order.
        let mut clusters: Vec<(usize, f32, f32)> = Vec::new();
        let mut pen = 0.0f32;
        for (&cluster, &advance) in self.clusters.iter().zip(self.advances.iter()) {
            let start = cluster as usize;
            match clusters.last_mut() {
                Some(last) if last.0 == start => last.2 += advance,
                _ => clusters.push((start, pen, advance)),
            }
            pen += advance;
        }

        let mut covered = 0usize;
        for (i, &(start, x, advance)) in clusters.iter().enumerate() {
            let start = start.min(self.code_units);
            let end = clusters
                .get(i + 1)
                .map_or(self.code_units, |next| next.0.min(self.code_units))
                .max(start);
            // Units before the first cluster sit at its leading edge.
            for stop in stops.iter_mut().take(start).skip(covered) {
                *stop = x;
            }
            let span = (end - start).max(1) as f32;
            for unit in start..end {
                stops[unit] = x + advance * (unit - start) as f32 / span;
            }
            covered = end;
        }
        for stop in stops.iter_mut().skip(covered) {
            *stop = self.width;
        }
        stops
    }
}
