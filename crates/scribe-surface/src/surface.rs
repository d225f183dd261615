use std::sync::Arc;

use scribe_text::font::{AntialiasMode, DeviceFontMetrics, FontHandle};
use scribe_text::layout::{DeviceContext, LayoutService, PositionTable, measure};
use tiny_skia::{
    FillRule, FilterQuality, IntRect, IntSize, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    Rect, Transform,
};

use crate::device::{HostWindow, PaintDevice};
use crate::geometry::{Bounds, Point};
use crate::paint::{Colour, PaintContext, Pen, pixel_centre, solid_paint};
use crate::text::composite_glyphs;

/// Added to every descent the layout service reports.
///
/// Qt's font engines historically returned a descent one pixel short to
/// balance a `height = ascent + descent + 1` formula. Caret and line-height
/// arithmetic in editors built on those metrics expects the corrected
/// value, so the compensation is kept for every service.
pub const DESCENT_COMPENSATION: f32 = 1.0;

/// Edge length of the square blocks a pattern fill tiles with.
pub const PATTERN_TILE_SIZE: u32 = 8;

/// Corner radius of [`Surface::rounded_rectangle`] as a fraction of half
/// the rectangle's extent on each axis.
pub const ROUNDED_CORNER_ROUNDNESS: f32 = 0.25;

/// Drawing and measurement operations an editor needs from a paint target.
///
/// Every drawing primitive expects a bound surface. Metric queries work
/// unbound, evaluated at the surface's default DPI.
pub trait Surface {
    fn initialised(&self) -> bool;

    /// Drop paint resources and, when owned, the device. Idempotent.
    fn release(&mut self);

    fn device(&self) -> Option<&PaintDevice>;

    fn log_pixels_y(&self) -> f32;

    fn device_height_font(&self, points: f32) -> f32;

    /// Caret position after every byte of a UTF-8 line.
    fn measure_widths(&self, font: &FontHandle, text: &[u8]) -> PositionTable;

    fn width_text(&self, font: &FontHandle, text: &[u8]) -> f32;

    fn width_char(&self, font: &FontHandle, ch: char) -> f32;

    fn ascent(&self, font: &FontHandle) -> f32;

    /// Raw descent plus [`DESCENT_COMPENSATION`].
    fn descent(&self, font: &FontHandle) -> f32;

    fn internal_leading(&self, font: &FontHandle) -> f32;

    fn external_leading(&self, font: &FontHandle) -> f32;

    fn height(&self, font: &FontHandle) -> f32;

    fn average_char_width(&self, font: &FontHandle) -> f32;

    fn pen_colour(&mut self, fore: Colour);

    fn move_to(&mut self, x: f32, y: f32);

    fn line_to(&mut self, x: f32, y: f32);

    fn polygon(&mut self, points: &[Point], fore: Colour, back: Colour);

    /// Filled rectangle with a one-pixel outline inside `rc`.
    fn rectangle_draw(&mut self, rc: Bounds, fore: Colour, back: Colour);

    fn fill_rectangle(&mut self, rc: Bounds, back: Colour);

    /// Tile `rc` with the top-left [`PATTERN_TILE_SIZE`] block of `pattern`.
    fn fill_rectangle_pattern(&mut self, rc: Bounds, pattern: &dyn Surface);

    fn rounded_rectangle(&mut self, rc: Bounds, fore: Colour, back: Colour);

    fn alpha_rectangle(
        &mut self,
        rc: Bounds,
        corner_size: f32,
        fill: Colour,
        alpha_fill: u8,
        outline: Colour,
        alpha_outline: u8,
    );

    /// Blit premultiplied RGBA `pixels` scaled to `rc`'s width.
    fn draw_rgba_image(&mut self, rc: Bounds, width: u32, height: u32, pixels: &[u8]);

    fn ellipse(&mut self, rc: Bounds, fore: Colour, back: Colour);

    /// Copy `source`'s pixels from `from` onwards to `rc`'s top-left corner.
    fn copy(&mut self, rc: Bounds, from: Point, source: &dyn Surface);

    fn draw_text_no_clip(
        &mut self,
        rc: Bounds,
        font: &FontHandle,
        ybase: f32,
        text: &[u8],
        fore: Colour,
        back: Colour,
    );

    /// Draw like [`draw_text_no_clip`](Self::draw_text_no_clip) clipped to
    /// `rc`; the clip is always cleared afterwards.
    fn draw_text_clipped(
        &mut self,
        rc: Bounds,
        font: &FontHandle,
        ybase: f32,
        text: &[u8],
        fore: Colour,
        back: Colour,
    );

    fn draw_text_transparent(
        &mut self,
        rc: Bounds,
        font: &FontHandle,
        ybase: f32,
        text: &[u8],
        fore: Colour,
    );

    fn set_clip(&mut self, rc: Bounds);

    fn clear_clip(&mut self);

    /// Reset pen and brush when a paint context exists.
    fn flush_cached_state(&mut self);
}

enum Binding<'a> {
    Unbound,
    Borrowed(&'a mut PaintDevice),
    Owned(Box<PaintDevice>),
    /// Offscreen allocation failed; drawing is a no-op until re-initialised.
    Unavailable,
}

struct Session<'s> {
    pixmap: &'s mut Pixmap,
    paint: &'s mut PaintContext,
}

impl Session<'_> {
    fn fill(&mut self, path: &Path, paint: &Paint<'_>) {
        self.pixmap.fill_path(
            path,
            paint,
            FillRule::Winding,
            Transform::identity(),
            self.paint.clip.as_ref(),
        );
    }

    fn stroke(&mut self, path: &Path, paint: &Paint<'_>) {
        self.pixmap.stroke_path(
            path,
            paint,
            &self.paint.pen.stroke(),
            Transform::identity(),
            self.paint.clip.as_ref(),
        );
    }

    fn fill_and_outline(&mut self, path: &Path) {
        let brush = self.paint.brush_paint();
        let pen = self.paint.pen_paint();
        self.fill(path, &brush);
        self.stroke(path, &pen);
    }
}

/// Raster implementation of [`Surface`] over a [`PaintDevice`].
///
/// Unbound until one of the `init_*` methods binds a device; window and
/// device bindings borrow, offscreen bindings own. The paint context is
/// created by the first primitive and discarded on release.
pub struct DrawingSurface<'a> {
    layout: Arc<dyn LayoutService>,
    default_dpi: f32,
    binding: Binding<'a>,
    paint: Option<PaintContext>,
    current: Point,
}

impl<'a> DrawingSurface<'a> {
    pub fn new(layout: Arc<dyn LayoutService>, default_dpi: f32) -> Self {
        Self {
            layout,
            default_dpi: DeviceContext::new(default_dpi).logical_dpi,
            binding: Binding::Unbound,
            paint: None,
            current: Point::default(),
        }
    }

    /// Paint into the device `window` exposes.
    pub fn init_window<W: HostWindow + ?Sized>(&mut self, window: &'a mut W) {
        self.release();
        let device = window.paint_device();
        tracing::debug!(width = device.width(), height = device.height(), "surface bound to window");
        self.binding = Binding::Borrowed(device);
    }

    /// Paint into an existing device the caller keeps ownership of.
    pub fn init_device(&mut self, device: &'a mut PaintDevice) {
        self.release();
        tracing::debug!(width = device.width(), height = device.height(), "surface bound to device");
        self.binding = Binding::Borrowed(device);
    }

    /// Allocate a transparent bitmap of at least 1x1 owned by this surface.
    pub fn init_offscreen(&mut self, width: u32, height: u32) {
        self.release();
        let (width, height) = (width.max(1), height.max(1));
        match PaintDevice::new(width, height, self.default_dpi) {
            Some(device) => {
                tracing::debug!(width, height, "offscreen surface allocated");
                self.binding = Binding::Owned(Box::new(device));
            }
            None => {
                tracing::warn!(width, height, "offscreen allocation failed");
                self.binding = Binding::Unavailable;
            }
        }
    }

    pub fn layout(&self) -> &Arc<dyn LayoutService> {
        &self.layout
    }

    /// Measurement context of the bound device, or the default DPI.
    pub fn device_context(&self) -> DeviceContext {
        self.device()
            .map(PaintDevice::context)
            .unwrap_or_else(|| DeviceContext::new(self.default_dpi))
    }

    /// The paint context, if a primitive has created one.
    pub fn paint_context(&self) -> Option<&PaintContext> {
        self.paint.as_ref()
    }

    /// Take an owned offscreen device out of the surface, leaving it unbound.
    pub fn into_device(mut self) -> Option<PaintDevice> {
        self.paint = None;
        match std::mem::replace(&mut self.binding, Binding::Unbound) {
            Binding::Owned(device) => Some(*device),
            _ => None,
        }
    }

    fn session(&mut self) -> Option<Session<'_>> {
        debug_assert!(
            !matches!(self.binding, Binding::Unbound),
            "drawing on a surface that is not bound to a device"
        );
        let device = match &mut self.binding {
            Binding::Borrowed(device) => &mut **device,
            Binding::Owned(device) => device.as_mut(),
            Binding::Unavailable => return None,
            Binding::Unbound => {
                tracing::warn!("drawing on an unbound surface ignored");
                return None;
            }
        };
        let paint = self.paint.get_or_insert_with(PaintContext::new);
        Some(Session {
            pixmap: device.pixmap_mut(),
            paint,
        })
    }

    fn metrics(&self, font: &FontHandle) -> DeviceFontMetrics {
        font.parameters()
            .and_then(|params| self.layout.font_metrics(params, &self.device_context()))
            .unwrap_or_default()
    }

    fn text_width(&self, font: &FontHandle, text: &str) -> f32 {
        let Some(params) = font.parameters() else {
            return 0.0;
        };
        self.layout
            .shape(text, params, &self.device_context())
            .map(|layout| layout.width())
            .unwrap_or(0.0)
    }

    fn draw_text(
        &mut self,
        rc: Bounds,
        font: &FontHandle,
        ybase: f32,
        text: &[u8],
        fore: Colour,
        back: Option<Colour>,
    ) {
        let device = self.device_context();
        let layout = Arc::clone(&self.layout);
        let Some(mut session) = self.session() else {
            return;
        };
        session.paint.pen = Pen::new(fore);

        let Some(params) = font.parameters() else {
            tracing::warn!("drawing text with a released font");
            return;
        };
        let text = String::from_utf8_lossy(text);

        if let Some(back) = back {
            let width = layout
                .shape(&text, params, &device)
                .map(|shaped| shaped.width())
                .unwrap_or(0.0);
            let metrics = layout.font_metrics(params, &device).unwrap_or_default();
            let background = Bounds::new(
                rc.left,
                ybase - metrics.ascent,
                rc.left + width,
                ybase + metrics.descent,
            );
            if let Some(rect) = background.to_rect() {
                session.fill(&PathBuilder::from_rect(rect), &solid_paint(back, u8::MAX));
            }
        }

        let glyphs = layout.rasterize(&text, params, &device);
        let antialias = session.paint.text_antialias && params.antialias != AntialiasMode::None;
        composite_glyphs(
            session.pixmap,
            &glyphs,
            rc.left,
            ybase,
            fore,
            antialias,
            session.paint.clip.as_ref(),
        );
    }
}

impl Drop for DrawingSurface<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for DrawingSurface<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let binding = match &self.binding {
            Binding::Unbound => "unbound",
            Binding::Borrowed(_) => "borrowed",
            Binding::Owned(_) => "owned",
            Binding::Unavailable => "unavailable",
        };
        f.debug_struct("DrawingSurface")
            .field("binding", &binding)
            .field("paint", &self.paint)
            .field("default_dpi", &self.default_dpi)
            .finish()
    }
}

impl Surface for DrawingSurface<'_> {
    fn initialised(&self) -> bool {
        self.device().is_some()
    }

    fn release(&mut self) {
        self.paint = None;
        self.current = Point::default();
        match std::mem::replace(&mut self.binding, Binding::Unbound) {
            Binding::Owned(_) => tracing::trace!("offscreen device destroyed"),
            Binding::Borrowed(_) => tracing::trace!("borrowed device released"),
            Binding::Unbound | Binding::Unavailable => {}
        }
    }

    fn device(&self) -> Option<&PaintDevice> {
        match &self.binding {
            Binding::Borrowed(device) => Some(&**device),
            Binding::Owned(device) => Some(device.as_ref()),
            Binding::Unbound | Binding::Unavailable => None,
        }
    }

    fn log_pixels_y(&self) -> f32 {
        self.device_context().logical_dpi
    }

    fn device_height_font(&self, points: f32) -> f32 {
        points
    }

    fn measure_widths(&self, font: &FontHandle, text: &[u8]) -> PositionTable {
        measure(text, font, self.layout.as_ref(), &self.device_context())
    }

    fn width_text(&self, font: &FontHandle, text: &[u8]) -> f32 {
        self.text_width(font, &String::from_utf8_lossy(text))
    }

    fn width_char(&self, font: &FontHandle, ch: char) -> f32 {
        let mut buf = [0u8; 4];
        self.text_width(font, ch.encode_utf8(&mut buf))
    }

    fn ascent(&self, font: &FontHandle) -> f32 {
        self.metrics(font).ascent
    }

    fn descent(&self, font: &FontHandle) -> f32 {
        self.metrics(font).descent + DESCENT_COMPENSATION
    }

    fn internal_leading(&self, font: &FontHandle) -> f32 {
        self.metrics(font).internal_leading
    }

    fn external_leading(&self, font: &FontHandle) -> f32 {
        self.metrics(font).external_leading
    }

    fn height(&self, font: &FontHandle) -> f32 {
        self.metrics(font).height
    }

    fn average_char_width(&self, font: &FontHandle) -> f32 {
        self.metrics(font).average_char_width
    }

    fn pen_colour(&mut self, fore: Colour) {
        if let Some(mut session) = self.session() {
            session.paint.pen = Pen::new(fore);
        }
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.current = Point::new(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let from = pixel_centre(self.current);
        let to = pixel_centre(Point::new(x, y));
        if let Some(mut session) = self.session() {
            let mut pb = PathBuilder::new();
            pb.move_to(from.x, from.y);
            pb.line_to(to.x, to.y);
            if let Some(path) = pb.finish() {
                let pen = session.paint.pen_paint();
                session.stroke(&path, &pen);
            }
        }
        self.current = Point::new(x, y);
    }

    fn polygon(&mut self, points: &[Point], fore: Colour, back: Colour) {
        let Some(mut session) = self.session() else {
            return;
        };
        session.paint.pen = Pen::new(fore);
        session.paint.brush = back;

        let mut pb = PathBuilder::new();
        for (i, point) in points.iter().map(|p| pixel_centre(*p)).enumerate() {
            if i == 0 {
                pb.move_to(point.x, point.y);
            } else {
                pb.line_to(point.x, point.y);
            }
        }
        pb.close();
        if let Some(path) = pb.finish() {
            session.fill_and_outline(&path);
        }
    }

    fn rectangle_draw(&mut self, rc: Bounds, fore: Colour, back: Colour) {
        let Some(mut session) = self.session() else {
            return;
        };
        session.paint.pen = Pen::new(fore);
        session.paint.brush = back;
        if let Some(rect) = outline_rect(rc) {
            session.fill_and_outline(&PathBuilder::from_rect(rect));
        }
    }

    fn fill_rectangle(&mut self, rc: Bounds, back: Colour) {
        let Some(mut session) = self.session() else {
            return;
        };
        if let Some(rect) = rc.to_rect() {
            session.fill(&PathBuilder::from_rect(rect), &solid_paint(back, u8::MAX));
        }
    }

    fn fill_rectangle_pattern(&mut self, rc: Bounds, pattern: &dyn Surface) {
        let Some(source) = pattern.device() else {
            return;
        };
        let Some(mut session) = self.session() else {
            return;
        };

        let (left, top) = (rc.left as i32, rc.top as i32);
        let (right, bottom) = (rc.right as i32, rc.bottom as i32);
        let tile = PATTERN_TILE_SIZE as i32;
        let paint = PixmapPaint::default();
        let block = |width: i32, height: i32| {
            IntRect::from_xywh(0, 0, width as u32, height as u32)
                .and_then(|rect| source.pixmap().clone_rect(rect))
        };
        let Some(full) = block(tile, tile) else {
            return;
        };

        for x in (left..right).step_by(PATTERN_TILE_SIZE as usize) {
            let width = tile.min(right - x);
            for y in (top..bottom).step_by(PATTERN_TILE_SIZE as usize) {
                let height = tile.min(bottom - y);
                // Only tiles cut by the right or bottom edge need their own copy.
                let edge;
                let tile_pixmap = if width == tile && height == tile {
                    full.as_ref()
                } else {
                    let Some(cut) = block(width, height) else {
                        continue;
                    };
                    edge = cut;
                    edge.as_ref()
                };
                session.pixmap.draw_pixmap(
                    x,
                    y,
                    tile_pixmap,
                    &paint,
                    Transform::identity(),
                    session.paint.clip.as_ref(),
                );
            }
        }
    }

    fn rounded_rectangle(&mut self, rc: Bounds, fore: Colour, back: Colour) {
        let Some(mut session) = self.session() else {
            return;
        };
        session.paint.pen = Pen::new(fore);
        session.paint.brush = back;

        let Some(rect) = outline_rect(Bounds::new(rc.left, rc.top, rc.right + 1.0, rc.bottom + 1.0))
        else {
            return;
        };
        let rx = rect.width() / 2.0 * ROUNDED_CORNER_ROUNDNESS;
        let ry = rect.height() / 2.0 * ROUNDED_CORNER_ROUNDNESS;
        if let Some(path) = rounded_rect_path(rect, rx, ry) {
            session.fill_and_outline(&path);
        }
    }

    fn alpha_rectangle(
        &mut self,
        rc: Bounds,
        corner_size: f32,
        fill: Colour,
        alpha_fill: u8,
        outline: Colour,
        alpha_outline: u8,
    ) {
        let Some(mut session) = self.session() else {
            return;
        };
        session.paint.pen = Pen::new(outline);
        session.paint.brush = fill;

        let Some(rect) = outline_rect(rc) else {
            return;
        };
        if let Some(path) = rounded_rect_path(rect, corner_size, corner_size) {
            session.fill(&path, &solid_paint(fill, alpha_fill));
            session.stroke(&path, &solid_paint(outline, alpha_outline));
        }
    }

    fn draw_rgba_image(&mut self, rc: Bounds, width: u32, height: u32, pixels: &[u8]) {
        let Some(mut session) = self.session() else {
            return;
        };
        let Some(size) = IntSize::from_wh(width, height) else {
            return;
        };
        let expected = width as usize * height as usize * 4;
        if pixels.len() < expected {
            tracing::warn!(width, height, len = pixels.len(), "image data shorter than its size");
            return;
        }

        // Colour channels may not exceed alpha in premultiplied data.
        let data = pixels[..expected]
            .chunks_exact(4)
            .flat_map(|px| [px[0].min(px[3]), px[1].min(px[3]), px[2].min(px[3]), px[3]])
            .collect();
        let Some(image) = Pixmap::from_vec(data, size) else {
            return;
        };

        let scale = rc.width() / width as f32;
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        let paint = PixmapPaint {
            quality: if scale == 1.0 {
                FilterQuality::Nearest
            } else {
                FilterQuality::Bilinear
            },
            ..PixmapPaint::default()
        };
        session.pixmap.draw_pixmap(
            0,
            0,
            image.as_ref(),
            &paint,
            Transform::from_row(scale, 0.0, 0.0, scale, rc.left, rc.top),
            session.paint.clip.as_ref(),
        );
    }

    fn ellipse(&mut self, rc: Bounds, fore: Colour, back: Colour) {
        let Some(mut session) = self.session() else {
            return;
        };
        session.paint.pen = Pen::new(fore);
        session.paint.brush = back;
        if let Some(path) = rc.to_rect().and_then(PathBuilder::from_oval) {
            session.fill_and_outline(&path);
        }
    }

    fn copy(&mut self, rc: Bounds, from: Point, source: &dyn Surface) {
        let Some(source) = source.device() else {
            return;
        };
        let Some(mut session) = self.session() else {
            return;
        };
        let (fx, fy) = (from.x.max(0.0) as u32, from.y.max(0.0) as u32);
        let region = IntRect::from_xywh(
            fx as i32,
            fy as i32,
            source.width().saturating_sub(fx),
            source.height().saturating_sub(fy),
        );
        let Some(pixels) = region.and_then(|rect| source.pixmap().clone_rect(rect)) else {
            return;
        };
        session.pixmap.draw_pixmap(
            rc.left as i32,
            rc.top as i32,
            pixels.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            session.paint.clip.as_ref(),
        );
    }

    fn draw_text_no_clip(
        &mut self,
        rc: Bounds,
        font: &FontHandle,
        ybase: f32,
        text: &[u8],
        fore: Colour,
        back: Colour,
    ) {
        self.draw_text(rc, font, ybase, text, fore, Some(back));
    }

    fn draw_text_clipped(
        &mut self,
        rc: Bounds,
        font: &FontHandle,
        ybase: f32,
        text: &[u8],
        fore: Colour,
        back: Colour,
    ) {
        self.set_clip(rc);
        self.draw_text_no_clip(rc, font, ybase, text, fore, back);
        self.clear_clip();
    }

    fn draw_text_transparent(
        &mut self,
        rc: Bounds,
        font: &FontHandle,
        ybase: f32,
        text: &[u8],
        fore: Colour,
    ) {
        self.draw_text(rc, font, ybase, text, fore, None);
    }

    fn set_clip(&mut self, rc: Bounds) {
        let Some(mut session) = self.session() else {
            return;
        };
        let Some(mut mask) = Mask::new(session.pixmap.width(), session.pixmap.height()) else {
            return;
        };
        // An empty rectangle leaves the mask clear, clipping everything.
        if let Some(rect) = rc.to_rect() {
            mask.fill_path(
                &PathBuilder::from_rect(rect),
                FillRule::Winding,
                false,
                Transform::identity(),
            );
        }
        session.paint.clip = Some(mask);
    }

    fn clear_clip(&mut self) {
        if let Some(paint) = self.paint.as_mut() {
            paint.clip = None;
        }
    }

    fn flush_cached_state(&mut self) {
        if let Some(paint) = self.paint.as_mut() {
            paint.reset_pen_and_brush();
        }
    }
}

/// Rectangle whose one-pixel outline covers exactly the pixels of `rc`:
/// the trailing edges are inset by one and the path runs through pixel
/// centres.
fn outline_rect(rc: Bounds) -> Option<Rect> {
    let inset = rc.inset_trailing();
    let start = pixel_centre(Point::new(inset.left, inset.top));
    let end = pixel_centre(Point::new(inset.right, inset.bottom));
    Rect::from_ltrb(start.x, start.y, end.x, end.y)
}

fn rounded_rect_path(rect: Rect, rx: f32, ry: f32) -> Option<Path> {
    let rx = rx.min(rect.width() / 2.0);
    let ry = ry.min(rect.height() / 2.0);
    if rx <= 0.0 || ry <= 0.0 {
        return Some(PathBuilder::from_rect(rect));
    }

    // Cubic approximation of a quarter ellipse.
    const KAPPA: f32 = 0.552_284_8;
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let (l, t, r, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());

    let mut pb = PathBuilder::new();
    pb.move_to(l + rx, t);
    pb.line_to(r - rx, t);
    pb.cubic_to(r - rx + kx, t, r, t + ry - ky, r, t + ry);
    pb.line_to(r, b - ry);
    pb.cubic_to(r, b - ry + ky, r - rx + kx, b, r - rx, b);
    pb.line_to(l + rx, b);
    pb.cubic_to(l + rx - kx, b, l, b - ry + ky, l, b - ry);
    pb.line_to(l, t + ry);
    pb.cubic_to(l, t + ry - ky, l + rx - kx, t, l + rx, t);
    pb.close();
    pb.finish()
}
