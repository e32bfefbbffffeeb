//! Configuration file handling
//!
//! Settings live in a single TOML file, `config.toml` by default, organised
//! in sections:
//! - Offsets applied by batch mode
//! - Moonraker print host connection
//! - Batch script behaviour (directories, timestamps, watch mode)
//! - Viewer bed dimensions
//!
//! Missing keys fall back to their defaults, so a partial file is accepted.

use crate::error::{SettingsError, SettingsResult};
use bedshift_core::constants::{DEFAULT_BED_HEIGHT_MM, DEFAULT_BED_WIDTH_MM, MAX_BED_SIZE_MM};
use bedshift_core::Offset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Offsets used by batch mode, in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetSettings {
    pub x_offset: f64,
    pub y_offset: f64,
}

impl OffsetSettings {
    pub fn as_offset(&self) -> Offset {
        Offset::new(self.x_offset, self.y_offset)
    }
}

impl Default for OffsetSettings {
    fn default() -> Self {
        Self {
            x_offset: 80.0,
            y_offset: 80.0,
        }
    }
}

/// Moonraker print host settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonrakerSettings {
    /// Base URL, e.g. `http://printer.local:7125`
    pub url: String,
    /// Upload every translated file
    pub auto_upload: bool,
    /// Start printing after a successful upload
    pub auto_start_print: bool,
}

impl Default for MoonrakerSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:7125".to_string(),
            auto_upload: true,
            auto_start_print: false,
        }
    }
}

/// Batch script settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    /// Append `_%Y%m%d_%H%M%S` to output names
    pub include_timestamp: bool,
    /// Keep watching the input directory after the first pass
    pub autowatch: bool,
    /// Seconds between passes in watch mode
    pub watch_interval: u64,
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            include_timestamp: false,
            autowatch: false,
            watch_interval: 60,
            input_directory: PathBuf::from("fixme"),
            output_directory: PathBuf::from("fixed"),
        }
    }
}

/// Interactive viewer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Bed width in mm
    pub bed_width: f64,
    /// Bed depth in mm
    pub bed_height: f64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            bed_width: DEFAULT_BED_WIDTH_MM,
            bed_height: DEFAULT_BED_HEIGHT_MM,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub offsets: OffsetSettings,
    pub moonraker: MoonrakerSettings,
    pub script: ScriptSettings,
    pub viewer: ViewerSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from a TOML file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path`, or write the defaults there first when it does not exist
    pub fn load_or_create(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            return Self::load_from_file(path);
        }
        let config = Self::default();
        config.save_to_file(path)?;
        info!("Created default configuration at {}", path.display());
        Ok(config)
    }

    /// Save config as TOML
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if !self.offsets.as_offset().is_finite() {
            return Err(SettingsError::invalid("offsets", "offsets must be finite"));
        }

        if self.moonraker.url.trim().is_empty() {
            return Err(SettingsError::invalid("moonraker.url", "must not be empty"));
        }

        if self.script.watch_interval == 0 {
            return Err(SettingsError::invalid(
                "script.watch_interval",
                "must be > 0",
            ));
        }

        if self.script.input_directory.as_os_str().is_empty()
            || self.script.output_directory.as_os_str().is_empty()
        {
            return Err(SettingsError::invalid(
                "script",
                "input and output directories must not be empty",
            ));
        }

        for (key, value) in [
            ("viewer.bed_width", self.viewer.bed_width),
            ("viewer.bed_height", self.viewer.bed_height),
        ] {
            // NaN and infinity fail this check too
            if !(value > 0.0 && value <= MAX_BED_SIZE_MM) {
                return Err(SettingsError::invalid(
                    key,
                    format!("must be > 0 and <= {MAX_BED_SIZE_MM} mm"),
                ));
            }
        }

        Ok(())
    }
}

/// Offsets from the configuration file at `path`
pub fn load_offsets_config(path: &Path) -> SettingsResult<Offset> {
    Config::load_or_create(path).map(|config| config.offsets.as_offset())
}
