use std::sync::Arc;

use anyhow::{Result, bail};
use scribe_config::ScribeConfig;
use scribe_surface::DrawingSurface;
use scribe_text::font::{DefaultFont, FALLBACK_SIZE_POINTS, default_font, init_default_font};
use scribe_text::{
    FixedAdvanceService, FontHandle, FontLibrary, FontParameters, LayoutService,
    SystemLayoutService,
};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`).
/// Later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// The layout service and configuration every surface and measurement
/// of one editor instance shares.
#[derive(Clone)]
pub struct Platform {
    layout: Arc<dyn LayoutService>,
    config: ScribeConfig,
}

impl Platform {
    pub fn new(layout: Arc<dyn LayoutService>, config: ScribeConfig) -> Self {
        configure_default_font(&config);
        Self { layout, config }
    }

    /// Shape with installed fonts plus the configured font directories.
    pub fn system(config: ScribeConfig) -> Result<Self> {
        let mut library = if config.text.load_system_fonts {
            FontLibrary::with_system_fonts()
        } else {
            FontLibrary::new()
        };
        for dir in &config.text.font_dirs {
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "font directory not found");
                continue;
            }
            library.load_fonts_dir(dir);
        }
        if library.is_empty() {
            bail!(
                "no fonts available (system fonts: {}, {} font directories)",
                config.text.load_system_fonts,
                config.text.font_dirs.len()
            );
        }
        tracing::info!(faces = library.len(), "font library ready");

        Ok(Self::new(Arc::new(SystemLayoutService::new(library)), config))
    }

    /// Deterministic metrics: every UTF-16 code unit is `advance` pixels.
    pub fn headless(advance: f32, config: ScribeConfig) -> Self {
        Self::new(Arc::new(FixedAdvanceService::new(advance)), config)
    }

    pub fn layout(&self) -> &Arc<dyn LayoutService> {
        &self.layout
    }

    pub fn config(&self) -> &ScribeConfig {
        &self.config
    }

    /// An unbound surface using this platform's service and default DPI.
    pub fn surface<'a>(&self) -> DrawingSurface<'a> {
        DrawingSurface::new(Arc::clone(&self.layout), self.config.surface.effective_dpi())
    }

    pub fn create_font(&self, params: FontParameters) -> FontHandle {
        FontHandle::create(params)
    }

    /// Handle for the configured default family and size, falling back to
    /// the process-wide default font.
    pub fn default_font(&self) -> FontHandle {
        let text = &self.config.text;
        let params = match &text.default_family {
            Some(family) => FontParameters::new(
                family.clone(),
                text.default_size.unwrap_or(FALLBACK_SIZE_POINTS),
            ),
            None => {
                let mut params = default_font().parameters();
                if let Some(size) = text.default_size {
                    params.size_points = size;
                }
                params
            }
        };
        FontHandle::create(params)
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn configure_default_font(config: &ScribeConfig) {
    let Some(family) = &config.text.default_family else {
        return;
    };
    let size = config.text.default_size.unwrap_or(FALLBACK_SIZE_POINTS);
    if let Err(rejected) = init_default_font(DefaultFont::new(family.clone(), size)) {
        tracing::debug!(family = %rejected.family, "default font already set");
    }
}
