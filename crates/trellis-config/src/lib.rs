//! Trellis configuration system
//!
//! Settings are read from `trellis.toml` in the working directory and can be
//! overridden with `TRELLIS_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors raised while reading a configuration file.
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

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrellisConfig {
    /// Window creation settings
    pub window: WindowConfig,
    /// Font settings
    pub text: TextConfig,
    /// Layout engine sizing and scrolling
    pub layout: LayoutConfig,
    /// Demo screen toggles
    pub demo: DemoConfig,
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Initial logical width
    pub width: u32,
    /// Initial logical height
    pub height: u32,
    pub resizable: bool,
    /// Render at the monitor's physical resolution
    pub high_dpi: bool,
    /// Present with FIFO (vsync) instead of the lowest-latency mode available
    pub vsync: bool,
}

/// Text configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Path to a font file (.ttf/.otf). When unset a system sans-serif is used.
    pub font: Option<PathBuf>,
    /// Body text size in pixels
    pub font_size: f32,
}

/// Layout engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Maximum number of elements declared in a single frame
    pub max_element_count: usize,
    /// Maximum number of cached word measurements
    pub max_measure_text_word_cache: usize,
    /// Allow click-and-drag scrolling of scroll containers
    pub drag_scrolling: bool,
    /// Pixels scrolled per wheel notch
    pub scroll_speed: f32,
}

/// Demo screen configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Show the 3D model element in the main content area
    pub show_model: bool,
    /// Distance from the camera at which the model is placed
    pub model_distance: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Trellis Demo".to_string(),
            width: 1024,
            height: 768,
            resizable: true,
            high_dpi: true,
            vsync: true,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 24.0,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_element_count: 8192,
            max_measure_text_word_cache: 16384,
            drag_scrolling: true,
            scroll_speed: 10.0,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            show_model: true,
            model_distance: 140.0,
        }
    }
}

fn env_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl TrellisConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
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

    /// Load `trellis.toml` from the current directory, or defaults if it is
    /// missing or malformed.
    pub fn load_or_default() -> Self {
        Self::load_from_file("trellis.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(title) = std::env::var("TRELLIS_TITLE") {
            self.window.title = title;
        }
        if let Ok(val) = std::env::var("TRELLIS_WIDTH") {
            if let Ok(width) = val.parse::<u32>() {
                self.window.width = width;
            }
        }
        if let Ok(val) = std::env::var("TRELLIS_HEIGHT") {
            if let Ok(height) = val.parse::<u32>() {
                self.window.height = height;
            }
        }
        if let Ok(val) = std::env::var("TRELLIS_VSYNC") {
            self.window.vsync = env_flag(&val);
        }

        if let Ok(font) = std::env::var("TRELLIS_FONT") {
            self.text.font = Some(PathBuf::from(font));
        }
        if let Ok(val) = std::env::var("TRELLIS_FONT_SIZE") {
            if let Ok(size) = val.parse::<f32>() {
                self.text.font_size = size;
            }
        }

        if let Ok(val) = std::env::var("TRELLIS_DRAG_SCROLLING") {
            self.layout.drag_scrolling = env_flag(&val);
        }
        if let Ok(val) = std::env::var("TRELLIS_SHOW_MODEL") {
            self.demo.show_model = env_flag(&val);
        }
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrellisConfig::default();
        assert_eq!(config.window.title, "Trellis Demo");
        assert_eq!((config.window.width, config.window.height), (1024, 768));
        assert!(config.window.vsync);
        assert_eq!(config.layout.max_element_count, 8192);
        assert!(config.text.font.is_none());
    }

    #[test]
    fn test_toml_serialization() {
        let config = TrellisConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: TrellisConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.layout.max_measure_text_word_cache, 16384);
        assert_eq!(parsed.demo.model_distance, 140.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let parsed: TrellisConfig = toml::from_str(
            r#"
            [window]
            width = 640

            [layout]
            scroll_speed = 25.0
            "#,
        )
        .unwrap();
        assert_eq!(parsed.window.width, 640);
        assert_eq!(parsed.window.height, 768);
        assert_eq!(parsed.layout.scroll_speed, 25.0);
        assert!(parsed.layout.drag_scrolling);
    }

    #[test]
    fn test_load_missing_file() {
        let err = TrellisConfig::load_from_file("does-not-exist/trellis.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("TRELLIS_TITLE", "env-title");
            std::env::set_var("TRELLIS_VSYNC", "false");
            std::env::set_var("TRELLIS_WIDTH", "not-a-number");
        }

        let mut config = TrellisConfig::default();
        config.merge_with_env();

        assert_eq!(config.window.title, "env-title");
        assert!(!config.window.vsync);
        assert_eq!(config.window.width, 1024);

        unsafe {
            std::env::remove_var("TRELLIS_TITLE");
            std::env::remove_var("TRELLIS_VSYNC");
            std::env::remove_var("TRELLIS_WIDTH");
        }
    }
}
