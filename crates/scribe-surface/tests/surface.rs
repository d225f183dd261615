use std::sync::Arc;

use scribe_surface::{
    Bounds, Colour, DESCENT_COMPENSATION, DrawingSurface, HostWindow, PATTERN_TILE_SIZE,
    PaintDevice, Point, Surface,
};
use scribe_text::{FixedAdvanceService, FontHandle, FontParameters, LayoutService};

const RED: Colour = Colour::rgb(255, 0, 0);
const BLUE: Colour = Colour::rgb(0, 0, 255);
const GREEN: Colour = Colour::rgb(0, 255, 0);

fn service() -> Arc<dyn LayoutService> {
    Arc::new(FixedAdvanceService::new(4.0))
}

fn surface<'a>() -> DrawingSurface<'a> {
    DrawingSurface::new(service(), 96.0)
}

/// 12pt at 96 dpi: 16px, ascent 12.8, descent 3.2.
fn font() -> FontHandle {
    FontHandle::create(FontParameters::new("Reference", 12.0))
}

fn rgb_at(surface: &DrawingSurface<'_>, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
    let px = surface.device()?.pixmap().pixel(x, y)?;
    Some((px.red(), px.green(), px.blue(), px.alpha()))
}

fn opaque(colour: Colour) -> Option<(u8, u8, u8, u8)> {
    Some((colour.r, colour.g, colour.b, 255))
}

const CLEAR: Option<(u8, u8, u8, u8)> = Some((0, 0, 0, 0));

#[test]
fn offscreen_is_at_least_one_pixel() {
    let mut surface = surface();
    surface.init_offscreen(0, 0);
    assert!(surface.initialised());
    let device = surface.device().unwrap();
    assert_eq!((device.width(), device.height()), (1, 1));
    assert_eq!(surface.log_pixels_y(), 96.0);
}

#[test]
fn release_is_idempotent() {
    let mut surface = surface();
    surface.release();
    surface.init_offscreen(4, 4);
    surface.fill_rectangle(Bounds::new(0.0, 0.0, 4.0, 4.0), RED);
    assert!(surface.paint_context().is_some());

    surface.release();
    assert!(!surface.initialised());
    assert!(surface.paint_context().is_none());
    surface.release();
    assert!(!surface.initialised());
}

#[test]
fn borrowed_device_outlives_release() {
    let mut device = PaintDevice::new(6, 6, 120.0).unwrap();
    {
        let mut surface = surface();
        surface.init_device(&mut device);
        assert_eq!(surface.log_pixels_y(), 120.0);
        surface.fill_rectangle(Bounds::new(1.0, 1.0, 3.0, 3.0), GREEN);
        surface.release();
        assert!(!surface.initialised());
    }
    let px = device.pixmap().pixel(2, 2).unwrap();
    assert_eq!((px.green(), px.alpha()), (255, 255));
    assert_eq!(device.pixmap().pixel(4, 4).unwrap().alpha(), 0);
}

struct Window {
    device: PaintDevice,
}

impl HostWindow for Window {
    fn paint_device(&mut self) -> &mut PaintDevice {
        &mut self.device
    }
}

#[test]
fn window_binding_paints_into_the_window() {
    let mut window = Window {
        device: PaintDevice::new(4, 4, 96.0).unwrap(),
    };
    {
        let mut surface = surface();
        surface.init_window(&mut window);
        surface.fill_rectangle(Bounds::new(0.0, 0.0, 4.0, 4.0), BLUE);
    }
    assert_eq!(window.device.pixmap().pixel(3, 3).unwrap().blue(), 255);
}

#[test]
fn rebinding_replaces_owned_device() {
    let mut surface = surface();
    surface.init_offscreen(3, 3);
    surface.init_offscreen(5, 2);
    let device = surface.device().unwrap();
    assert_eq!((device.width(), device.height()), (5, 2));
}

#[test]
fn failed_allocation_makes_drawing_a_no_op() {
    let mut surface = surface();
    surface.init_offscreen(u32::MAX, u32::MAX);
    assert!(!surface.initialised());
    surface.fill_rectangle(Bounds::new(0.0, 0.0, 4.0, 4.0), RED);
    surface.draw_text_clipped(
        Bounds::new(0.0, 0.0, 4.0, 4.0),
        &font(),
        3.0,
        b"abc",
        RED,
        BLUE,
    );
    assert!(surface.paint_context().is_none());
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "not bound")]
fn drawing_unbound_is_a_programming_error() {
    let mut surface = surface();
    surface.fill_rectangle(Bounds::new(0.0, 0.0, 1.0, 1.0), RED);
}

#[test]
fn metrics_come_from_the_layout_service() {
    let surface = surface();
    let font = font();
    assert!((surface.ascent(&font) - 12.8).abs() < 1e-4);
    assert!((surface.descent(&font) - (3.2 + DESCENT_COMPENSATION)).abs() < 1e-4);
    assert!((surface.height(&font) - 16.0).abs() < 1e-4);
    assert_eq!(surface.internal_leading(&font), 0.0);
    assert_eq!(surface.external_leading(&font), 0.0);
    assert_eq!(surface.average_char_width(&font), 4.0);
    assert_eq!(surface.width_text(&font, "a😀".as_bytes()), 12.0);
    assert_eq!(surface.width_char(&font, 'x'), 4.0);
    assert_eq!(surface.device_height_font(9.0), 9.0);
}

#[test]
fn released_font_reports_zero_metrics() {
    let surface = surface();
    let mut font = font();
    font.release();
    assert_eq!(surface.ascent(&font), 0.0);
    assert_eq!(surface.descent(&font), DESCENT_COMPENSATION);
    assert_eq!(surface.width_text(&font, b"abc"), 0.0);
    assert_eq!(surface.measure_widths(&font, b"abc").as_slice(), &[0.0; 3]);
}

#[test]
fn measure_widths_uses_the_surface_service() {
    let surface = surface();
    let table = surface.measure_widths(&font(), "a😀b".as_bytes());
    assert_eq!(table.as_slice(), &[4.0, 12.0, 12.0, 12.0, 12.0, 16.0]);
}

#[test]
fn rectangle_outline_stays_inside_bounds() {
    let mut surface = surface();
    surface.init_offscreen(10, 10);
    surface.rectangle_draw(Bounds::new(2.0, 2.0, 8.0, 8.0), RED, BLUE);

    assert_eq!(rgb_at(&surface, 2, 2), opaque(RED));
    assert_eq!(rgb_at(&surface, 7, 7), opaque(RED));
    assert_eq!(rgb_at(&surface, 7, 4), opaque(RED));
    assert_eq!(rgb_at(&surface, 4, 4), opaque(BLUE));
    assert_eq!(rgb_at(&surface, 8, 8), CLEAR);
    assert_eq!(rgb_at(&surface, 8, 4), CLEAR);
}

#[test]
fn fill_rectangle_is_exact() {
    let mut surface = surface();
    surface.init_offscreen(6, 6);
    surface.fill_rectangle(Bounds::new(1.0, 1.0, 4.0, 4.0), GREEN);
    assert_eq!(rgb_at(&surface, 1, 1), opaque(GREEN));
    assert_eq!(rgb_at(&surface, 3, 3), opaque(GREEN));
    assert_eq!(rgb_at(&surface, 4, 4), CLEAR);
    assert_eq!(rgb_at(&surface, 0, 0), CLEAR);
}

#[test]
fn lines_follow_the_current_point() {
    let mut surface = surface();
    surface.init_offscreen(10, 10);
    surface.pen_colour(RED);
    surface.move_to(0.0, 5.0);
    surface.line_to(8.0, 5.0);
    surface.line_to(8.0, 9.0);

    assert_eq!(rgb_at(&surface, 3, 5), opaque(RED));
    assert_eq!(rgb_at(&surface, 3, 4), CLEAR);
    assert_eq!(rgb_at(&surface, 3, 6), CLEAR);
    assert_eq!(rgb_at(&surface, 8, 7), opaque(RED));
}

#[test]
fn pattern_fill_tiles_from_the_source_origin() -> anyhow::Result<()> {
    let mut pattern = surface();
    pattern.init_offscreen(PATTERN_TILE_SIZE, PATTERN_TILE_SIZE);
    // Left half red, right half blue.
    let half = PATTERN_TILE_SIZE as f32 / 2.0;
    let tile = PATTERN_TILE_SIZE as f32;
    pattern.fill_rectangle(Bounds::new(0.0, 0.0, half, tile), RED);
    pattern.fill_rectangle(Bounds::new(half, 0.0, tile, tile), BLUE);

    let mut target = surface();
    target.init_offscreen(24, 24);
    target.fill_rectangle_pattern(Bounds::new(2.0, 2.0, 22.0, 20.0), &pattern);

    // Tiles start at x = 2, 10, 18.
    assert_eq!(rgb_at(&target, 2, 2), opaque(RED));
    assert_eq!(rgb_at(&target, 6, 2), opaque(BLUE));
    assert_eq!(rgb_at(&target, 10, 10), opaque(RED));
    assert_eq!(rgb_at(&target, 14, 19), opaque(BLUE));
    // The last column of tiles is cut at the right edge (18..22).
    assert_eq!(rgb_at(&target, 21, 5), opaque(RED));
    assert_eq!(rgb_at(&target, 22, 5), CLEAR);
    assert_eq!(rgb_at(&target, 5, 20), CLEAR);
    assert_eq!(rgb_at(&target, 1, 1), CLEAR);
    Ok(())
}

#[test]
fn pattern_fill_cuts_bottom_and_right_tiles() {
    let mut pattern = surface();
    pattern.init_offscreen(PATTERN_TILE_SIZE, PATTERN_TILE_SIZE);
    // Top half green, bottom half red.
    let half = PATTERN_TILE_SIZE as f32 / 2.0;
    let tile = PATTERN_TILE_SIZE as f32;
    pattern.fill_rectangle(Bounds::new(0.0, 0.0, tile, half), GREEN);
    pattern.fill_rectangle(Bounds::new(0.0, half, tile, tile), RED);

    let mut target = surface();
    target.init_offscreen(20, 20);
    // Two full rows of tiles and a 3 pixel bottom row; two full columns
    // and a 2 pixel right column.
    target.fill_rectangle_pattern(Bounds::new(0.0, 0.0, 18.0, 19.0), &pattern);

    for x in [0, 9, 17] {
        assert_eq!(rgb_at(&target, x, 1), opaque(GREEN), "x {x}");
        assert_eq!(rgb_at(&target, x, 12), opaque(RED), "x {x}");
        assert_eq!(rgb_at(&target, x, 18), opaque(GREEN), "x {x}");
        assert_eq!(rgb_at(&target, x, 19), CLEAR, "x {x}");
    }
    assert_eq!(rgb_at(&target, 18, 0), CLEAR);

    // A region smaller than one tile takes only its corner of the pattern.
    let mut small = surface();
    small.init_offscreen(6, 6);
    small.fill_rectangle_pattern(Bounds::new(1.0, 1.0, 4.0, 6.0), &pattern);
    assert_eq!(rgb_at(&small, 1, 1), opaque(GREEN));
    assert_eq!(rgb_at(&small, 3, 5), opaque(RED));
    assert_eq!(rgb_at(&small, 4, 5), CLEAR);
}

#[test]
fn copy_takes_source_pixels_from_an_offset() {
    let mut source = surface();
    source.init_offscreen(6, 6);
    source.fill_rectangle(Bounds::new(3.0, 3.0, 6.0, 6.0), GREEN);

    let mut target = surface();
    target.init_offscreen(6, 6);
    target.copy(Bounds::new(0.0, 0.0, 3.0, 3.0), Point::new(3.0, 3.0), &source);
    assert_eq!(rgb_at(&target, 0, 0), opaque(GREEN));
    assert_eq!(rgb_at(&target, 2, 2), opaque(GREEN));
    assert_eq!(rgb_at(&target, 3, 3), CLEAR);
}

#[test]
fn rgba_image_is_scaled_to_the_target_width() {
    let mut surface = surface();
    surface.init_offscreen(8, 8);
    // 2x1 image: opaque red, then fully transparent.
    let pixels = [255, 0, 0, 255, 0, 0, 0, 0];
    surface.draw_rgba_image(Bounds::new(0.0, 0.0, 2.0, 1.0), 2, 1, &pixels);
    assert_eq!(rgb_at(&surface, 0, 0), opaque(RED));
    assert_eq!(rgb_at(&surface, 1, 0), CLEAR);

    // Short data is ignored.
    surface.draw_rgba_image(Bounds::new(4.0, 4.0, 6.0, 5.0), 2, 1, &pixels[..4]);
    assert_eq!(rgb_at(&surface, 4, 4), CLEAR);
}

#[test]
fn ellipse_and_rounded_rectangle_fill_their_centres() {
    let mut surface = surface();
    surface.init_offscreen(40, 20);
    surface.ellipse(Bounds::new(0.0, 0.0, 16.0, 16.0), RED, BLUE);
    surface.rounded_rectangle(Bounds::new(20.0, 0.0, 36.0, 16.0), RED, GREEN);

    assert_eq!(rgb_at(&surface, 8, 8), opaque(BLUE));
    assert_eq!(rgb_at(&surface, 0, 0), CLEAR);
    assert_eq!(rgb_at(&surface, 28, 8), opaque(GREEN));
    assert_eq!(rgb_at(&surface, 20, 0), CLEAR);
    assert_eq!(rgb_at(&surface, 28, 0), opaque(RED));
}

#[test]
fn alpha_rectangle_blends_fill() {
    let mut surface = surface();
    surface.init_offscreen(10, 10);
    surface.alpha_rectangle(Bounds::new(0.0, 0.0, 10.0, 10.0), 0.0, BLUE, 128, RED, 255);
    let (_, _, blue, alpha) = rgb_at(&surface, 5, 5).unwrap();
    assert!((120..=136).contains(&alpha), "alpha {alpha}");
    assert_eq!(blue, alpha);
    assert_eq!(rgb_at(&surface, 0, 5), opaque(RED));
    assert_eq!(rgb_at(&surface, 9, 5), opaque(RED));
}

#[test]
fn polygon_fills_and_outlines() {
    let mut surface = surface();
    surface.init_offscreen(12, 12);
    let points = [
        Point::new(1.0, 1.0),
        Point::new(10.0, 1.0),
        Point::new(10.0, 10.0),
        Point::new(1.0, 10.0),
    ];
    surface.polygon(&points, RED, GREEN);
    assert_eq!(rgb_at(&surface, 5, 5), opaque(GREEN));
    assert_eq!(rgb_at(&surface, 5, 1), opaque(RED));
    assert_eq!(rgb_at(&surface, 0, 0), CLEAR);
}

#[test]
fn opaque_text_paints_background_and_glyphs() {
    let mut surface = surface();
    surface.init_offscreen(20, 20);
    surface.draw_text_no_clip(Bounds::new(0.0, 0.0, 20.0, 20.0), &font(), 14.0, b"ab", RED, BLUE);

    // Glyph boxes span 13px above the baseline; the background reaches
    // the descent below it.
    assert_eq!(rgb_at(&surface, 1, 5), opaque(RED));
    assert_eq!(rgb_at(&surface, 6, 5), opaque(RED));
    assert_eq!(rgb_at(&surface, 1, 16), opaque(BLUE));
    assert_eq!(rgb_at(&surface, 10, 5), CLEAR);
}

#[test]
fn transparent_text_leaves_background() {
    let mut surface = surface();
    surface.init_offscreen(20, 20);
    surface.draw_text_transparent(Bounds::new(0.0, 0.0, 20.0, 20.0), &font(), 14.0, b"a", RED);
    assert_eq!(rgb_at(&surface, 1, 5), opaque(RED));
    assert_eq!(rgb_at(&surface, 1, 16), CLEAR);
}

#[test]
fn clipped_text_clears_its_clip() {
    let mut surface = surface();
    surface.init_offscreen(20, 20);
    surface.draw_text_clipped(Bounds::new(0.0, 0.0, 4.0, 20.0), &font(), 14.0, b"ab", RED, BLUE);

    assert_eq!(rgb_at(&surface, 1, 5), opaque(RED));
    assert_eq!(rgb_at(&surface, 5, 5), CLEAR);
    assert!(surface.paint_context().unwrap().clip.is_none());

    surface.fill_rectangle(Bounds::new(0.0, 0.0, 20.0, 20.0), GREEN);
    assert_eq!(rgb_at(&surface, 15, 15), opaque(GREEN));
}

#[test]
fn set_clip_limits_drawing_until_cleared() {
    let mut surface = surface();
    surface.init_offscreen(10, 10);
    surface.set_clip(Bounds::new(0.0, 0.0, 5.0, 5.0));
    surface.fill_rectangle(Bounds::new(0.0, 0.0, 10.0, 10.0), RED);
    assert_eq!(rgb_at(&surface, 2, 2), opaque(RED));
    assert_eq!(rgb_at(&surface, 7, 7), CLEAR);

    surface.clear_clip();
    surface.fill_rectangle(Bounds::new(0.0, 0.0, 10.0, 10.0), BLUE);
    assert_eq!(rgb_at(&surface, 7, 7), opaque(BLUE));
}

#[test]
fn zero_width_clip_hides_everything() {
    let mut surface = surface();
    surface.init_offscreen(10, 10);
    surface.set_clip(Bounds::new(5.0, 5.0, 5.0, 9.0));
    surface.fill_rectangle(Bounds::new(0.0, 0.0, 10.0, 10.0), RED);
    assert_eq!(rgb_at(&surface, 5, 6), CLEAR);
    assert_eq!(rgb_at(&surface, 0, 0), CLEAR);
}

#[test]
fn flush_resets_pen_and_brush() {
    let mut surface = surface();
    surface.flush_cached_state();
    surface.init_offscreen(4, 4);
    surface.rectangle_draw(Bounds::new(0.0, 0.0, 4.0, 4.0), RED, BLUE);
    surface.flush_cached_state();
    let paint = surface.paint_context().unwrap();
    assert_eq!(paint.pen.colour, Colour::BLACK);
    assert_eq!(paint.brush, Colour::WHITE);
    assert!(paint.text_antialias);
}

#[test]
fn surfaces_are_usable_as_trait_objects() {
    let mut owned = surface();
    owned.init_offscreen(2, 2);
    let surfaces: Vec<Box<dyn Surface>> = vec![Box::new(owned), Box::new(surface())];
    assert_eq!(
        surfaces.iter().map(|s| s.initialised()).collect::<Vec<_>>(),
        vec![true, false]
    );
}
