use tiny_skia::Rect;

/// A point in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle given by its edges. `right` and `bottom` are
/// exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// The rectangle with its trailing edges pulled in by one pixel, so an
    /// outline drawn along it stays inside the original pixels.
    pub fn inset_trailing(&self) -> Self {
        Self::new(self.left, self.top, self.right - 1.0, self.bottom - 1.0)
    }

    /// Converts to a tiny-skia rectangle; `None` when empty or not finite.
    pub fn to_rect(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        Rect::from_ltrb(self.left, self.top, self.right, self.bottom)
    }
}
