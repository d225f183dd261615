//! Raster paint targets a surface can bind to.

use scribe_text::layout::DeviceContext;
use tiny_skia::Pixmap;

/// A raster paint target: premultiplied RGBA pixels plus the logical DPI
/// text on it is measured at.
#[derive(Debug, Clone)]
pub struct PaintDevice {
    pixmap: Pixmap,
    logical_dpi: f32,
}

impl PaintDevice {
    /// Allocates a transparent device; `None` for a zero or oversized area.
    pub fn new(width: u32, height: u32, logical_dpi: f32) -> Option<Self> {
        let pixmap = Pixmap::new(width, height)?;
        Some(Self::from_pixmap(pixmap, logical_dpi))
    }

    pub fn from_pixmap(pixmap: Pixmap, logical_dpi: f32) -> Self {
        Self {
            pixmap,
            logical_dpi: DeviceContext::new(logical_dpi).logical_dpi,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn logical_dpi(&self) -> f32 {
        self.logical_dpi
    }

    /// Measurement context matching what is painted here.
    pub fn context(&self) -> DeviceContext {
        DeviceContext::new(self.logical_dpi)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }
}

/// A host window that exposes the device it paints into. The window keeps
/// ownership; surfaces only borrow it.
pub trait HostWindow {
    fn paint_device(&mut self) -> &mut PaintDevice;
}

impl HostWindow for PaintDevice {
    fn paint_device(&mut self) -> &mut PaintDevice {
        self
    }
}
