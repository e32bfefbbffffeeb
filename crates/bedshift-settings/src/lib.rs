//! Bedshift Settings Crate
//!
//! Loads, validates and writes the `config.toml` used by the CLI.

pub mod config;
pub mod error;

pub use config::{
    load_offsets_config, Config, MoonrakerSettings, OffsetSettings, ScriptSettings,
    ViewerSettings, DEFAULT_CONFIG_FILE,
};
pub use error::{SettingsError, SettingsResult};
