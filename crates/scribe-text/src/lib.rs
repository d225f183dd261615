//! scribe-text: fonts, shaping, and byte-offset text measurement.
//!
//! - `font`: font handles, the face library, metrics, and the process default
//! - `shaping`: single-run harfrust shaping with UTF-16 clusters
//! - `unicode`: UTF-8 lead-byte to UTF-16 code-unit decoding
//! - `layout`: the layout service contract and the position map

pub mod font;
pub mod layout;
pub mod shaping;
pub mod unicode;

pub use font::{
    AntialiasMode, DefaultFont, DeviceFontMetrics, FontError, FontFace, FontHandle, FontLibrary,
    FontMetrics, FontParameters, FontQuality, ScaledFontMetrics, default_font, init_default_font,
};

pub use layout::{
    DeviceContext, FixedAdvanceService, GlyphMask, LayoutService, PositionTable, ShapedLayout,
    SystemLayoutService, measure,
};
