//! scribe: text measurement and raster drawing for a code editor.
//!
//! Re-exports the member crates and provides [`Platform`], which picks the
//! layout service once at startup and hands it to every surface and
//! measurement.

mod platform;

pub use platform::{Platform, init_tracing};

pub use scribe_config as config;
pub use scribe_surface as surface;
pub use scribe_text as text;
