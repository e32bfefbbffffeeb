//! # Bedshift
//!
//! Shifts the X/Y origin of 3D-printer G-code programs.
//!
//! ## Architecture
//!
//! Bedshift is organized as a workspace with multiple crates:
//!
//! 1. **bedshift-core** - Points, offsets, constants, error types
//! 2. **bedshift-visualizer** - Line parser, offset transform, path model, bed viewport
//! 3. **bedshift-settings** - `config.toml` loading and validation
//! 4. **bedshift-communication** - Print host trait and Moonraker client
//! 5. **bedshift** - Batch pipeline, interactive session and the CLI binary
//!
//! ## Modes
//!
//! - **Batch**: translate every program in an input directory by the configured
//!   offset, optionally upload and print it, then archive the source
//! - **Interactive**: drag and zoom the toolpath over a bed preview and write a
//!   copy shifted by the dragged distance

pub mod batch;
pub mod session;

pub use bedshift_core::{ConnectionError, Error, GcodeError, Offset, Point, Result};

pub use bedshift_visualizer::{
    build_frame, translate_file, BedSize, Document, Frame, InteractionController,
    OffsetTransform, PathModel, TransformStats, ViewportMapper,
};

pub use bedshift_settings::{load_offsets_config, Config, SettingsError};

pub use bedshift_communication::{MoonrakerClient, NoOpPrintHost, PrintHost};

pub use batch::{process_directory, watch_directory, BatchOptions, BatchReport};
pub use session::InteractiveSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Log lines go to stderr. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
