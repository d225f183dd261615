//! scribe-surface: raster drawing surfaces for editor text and decorations.
//!
//! A [`DrawingSurface`] binds to a [`PaintDevice`] (borrowed from a host
//! window or owned offscreen), lazily creates a [`PaintContext`] and draws
//! with tiny-skia. Text measurement and metrics go through the same
//! [`LayoutService`](scribe_text::LayoutService) and device DPI that text
//! is painted with.

mod device;
mod geometry;
mod paint;
mod surface;
mod text;

pub use device::{HostWindow, PaintDevice};
pub use geometry::{Bounds, Point};
pub use paint::{Colour, PaintContext, Pen};
pub use surface::{
    DESCENT_COMPENSATION, DrawingSurface, PATTERN_TILE_SIZE, ROUNDED_CORNER_ROUNDNESS, Surface,
};
