//! Scribe configuration system
//!
//! Centralized settings for the text measurement and drawing layer, loaded
//! from `scribe.toml` with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "scribe.toml";

/// Logical DPI assumed for devices that do not report one.
pub const DEFAULT_DPI: f32 = 96.0;

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ScribeConfig {
    /// Font and shaping settings
    pub text: TextConfig,
    /// Drawing surface settings
    pub surface: SurfaceConfig,
}

/// Font and shaping configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// Family used when the host does not supply one
    pub default_family: Option<String>,
    /// Default font size in points
    pub default_size: Option<f32>,
    /// Extra directories scanned for font files
    pub font_dirs: Vec<PathBuf>,
    /// Load the platform's installed fonts into the shaping service
    pub load_system_fonts: bool,
}

/// Drawing surface configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Logical DPI assigned to offscreen bitmaps
    pub default_dpi: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            default_family: None,
            default_size: None,
            font_dirs: Vec::new(),
            load_system_fonts: true,
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            default_dpi: DEFAULT_DPI,
        }
    }
}

impl SurfaceConfig {
    /// DPI to use for new offscreen devices; falls back to [`DEFAULT_DPI`]
    /// when the configured value is unusable.
    pub fn effective_dpi(&self) -> f32 {
        if self.default_dpi.is_finite() && self.default_dpi > 0.0 {
            self.default_dpi
        } else {
            DEFAULT_DPI
        }
    }
}

fn env_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl ScribeConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `scribe.toml` in the current directory, or
    /// return defaults if it is missing or invalid
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(family) = std::env::var("SCRIBE_FONT_FAMILY") {
            if !family.trim().is_empty() {
                self.text.default_family = Some(family);
            }
        }
        if let Ok(val) = std::env::var("SCRIBE_FONT_SIZE") {
            if let Ok(size) = val.parse::<f32>() {
                self.text.default_size = Some(size);
            }
        }
        if let Ok(dir) = std::env::var("SCRIBE_FONT_DIR") {
            self.text.font_dirs.push(PathBuf::from(dir));
        }
        if let Ok(val) = std::env::var("SCRIBE_SYSTEM_FONTS") {
            self.text.load_system_fonts = env_flag(&val);
        }
        if let Ok(val) = std::env::var("SCRIBE_DPI") {
            if let Ok(dpi) = val.parse::<f32>() {
                self.surface.default_dpi = dpi;
            }
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from scribe.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
