//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GlowgridError, GlowgridResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where pattern files are stored.
    pub patterns_dir: PathBuf,

    /// Defaults applied to newly created patterns.
    pub defaults: PatternDefaults,

    /// Automation and baking behavior.
    pub automation: AutomationConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Defaults for "New Pattern".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternDefaults {
    /// Matrix width in LEDs.
    pub width: u32,

    /// Matrix height in LEDs.
    pub height: u32,

    /// Playback frame rate.
    pub fps: u32,

    /// Display duration for new frames.
    pub frame_duration_ms: u32,
}

/// Automation pipeline behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Fail a live render when a visible layer has no frame at the
    /// requested index, instead of treating the layer as transparent.
    pub strict_missing_frames: bool,

    /// Allow baking from frames that are themselves baked output.
    pub allow_rebake: bool,

    /// Mark a layer's actions as finalized once they have been baked.
    pub finalize_after_bake: bool,

    /// Frame count suggested to the bake command when none is given.
    pub default_bake_count: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "glowgrid=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            patterns_dir: dirs_default_patterns(),
            defaults: PatternDefaults::default(),
            automation: AutomationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PatternDefaults {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            fps: 10,
            frame_duration_ms: 100,
        }
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            strict_missing_frames: false,
            allow_rebake: false,
            finalize_after_bake: true,
            default_bake_count: 16,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: impl AsRef<Path>) -> GlowgridResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GlowgridError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the rest of the workspace cannot work with.
    pub fn validate(&self) -> GlowgridResult<()> {
        if self.defaults.width == 0 || self.defaults.height == 0 {
            return Err(GlowgridError::config(format!(
                "default matrix size must be non-zero, got {}x{}",
                self.defaults.width, self.defaults.height
            )));
        }
        if self.defaults.fps == 0 {
            return Err(GlowgridError::config("default fps must be non-zero"));
        }
        Ok(())
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("glowgrid").join("config.json")
}

/// Default patterns directory.
fn dirs_default_patterns() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("glowgrid").join("patterns")
}
