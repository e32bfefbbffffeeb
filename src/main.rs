//! Bedshift CLI
//!
//! Usage:
//!   bedshift transform <input.gcode> -o <output.gcode> [--dx 80 --dy 80]
//!   bedshift batch [--watch]
//!   bedshift preview <input.gcode> -o frame.svg [--drag 40,-20 --zoom 2 --commit-dir fixed]
//!   bedshift init-config

use anyhow::{Context, Result};
use bedshift::batch::{
    connect_print_host, process_directory, shutdown_on, watch_directory, BatchOptions,
};
use bedshift::{init_logging, BedSize, Config, InteractiveSession, Offset, Point};
use bedshift_communication::submit_for_upload;
use bedshift_settings::DEFAULT_CONFIG_FILE;
use bedshift_visualizer::utils::timestamp_now;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Shift the X/Y origin of 3D-printer G-code
#[derive(Parser, Debug)]
#[command(name = "bedshift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file, created with defaults when missing
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate one file
    Transform {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// X offset in mm (defaults to the configured offset)
        #[arg(long, allow_hyphen_values = true)]
        dx: Option<f64>,

        /// Y offset in mm (defaults to the configured offset)
        #[arg(long, allow_hyphen_values = true)]
        dy: Option<f64>,
    },

    /// Translate every file in the input directory
    Batch {
        /// Keep watching the input directory (also enabled by `script.autowatch`)
        #[arg(short, long)]
        watch: bool,
    },

    /// Render the bed preview, optionally after a drag and zoom, and commit the result
    Preview {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Surface width in pixels
        #[arg(long, default_value = "800")]
        width: f64,

        /// Surface height in pixels
        #[arg(long, default_value = "800")]
        height: f64,

        /// Drag from the surface centre by DX,DY pixels (screen Y points down)
        #[arg(long, value_name = "DX,DY", value_parser = parse_pixel_pair, allow_hyphen_values = true)]
        drag: Option<Point>,

        /// Zoom steps at the surface centre, negative to zoom out
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        zoom: i32,

        /// SVG output file
        #[arg(short, long, value_name = "SVG", default_value = "frame.svg")]
        output: PathBuf,

        /// Write the shifted program into this directory
        #[arg(long, value_name = "DIR")]
        commit_dir: Option<PathBuf>,

        /// Upload the committed program to the configured print host
        #[arg(long, requires = "commit_dir")]
        upload: bool,
    },

    /// Write a default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_pixel_pair(value: &str) -> std::result::Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY but got '{value}'"))?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(Point::new(x, y))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    match cli.command {
        Commands::InitConfig { force } => {
            if cli.config.exists() && !force {
                anyhow::bail!(
                    "{} already exists, use --force to overwrite",
                    cli.config.display()
                );
            }
            Config::default()
                .save_to_file(&cli.config)
                .with_context(|| format!("Failed to write {}", cli.config.display()))?;
            info!("Wrote default configuration to {}", cli.config.display());
        }

        Commands::Transform {
            input,
            output,
            dx,
            dy,
        } => {
            let config = load_config(&cli.config)?;
            let configured = config.offsets.as_offset();
            let offset = Offset::new(dx.unwrap_or(configured.dx), dy.unwrap_or(configured.dy));
            bedshift::translate_file(&input, &output, offset)
                .with_context(|| format!("Failed to translate {}", input.display()))?;
        }

        Commands::Batch { watch } => {
            let config = load_config(&cli.config)?;
            let options = BatchOptions::from(&config);
            info!("Auto-upload is set to: {}", options.auto_upload);
            info!("Auto-start print is set to: {}", options.auto_start_print);
            info!("Include timestamp is set to: {}", options.include_timestamp);

            let host = connect_print_host(&config.moonraker).await;
            if watch || config.script.autowatch {
                let interval = Duration::from_secs(config.script.watch_interval);
                let shutdown = shutdown_on(tokio::signal::ctrl_c());
                watch_directory(&options, host.as_ref(), interval, shutdown).await?;
            } else {
                let report = process_directory(&options, host.as_ref()).await?;
                info!(
                    "Batch finished: {} written, {} failed, {} uploaded",
                    report.written.len(),
                    report.failed.len(),
                    report.uploaded
                );
            }
        }

        Commands::Preview {
            input,
            width,
            height,
            drag,
            zoom,
            output,
            commit_dir,
            upload,
        } => {
            let config = load_config(&cli.config)?;
            let bed = BedSize::new(config.viewer.bed_width, config.viewer.bed_height);
            let committed = {
                let mut session = InteractiveSession::open(&input, bed, (width, height))
                    .with_context(|| format!("Failed to open {}", input.display()))?;
                session.on_offset_changed(|offset| info!("Offset: {}", offset));

                let centre = Point::new(width / 2.0, height / 2.0);
                if let Some(delta) = drag {
                    session.press(centre);
                    session.move_to(centre + delta);
                    session.release();
                }
                for _ in 0..zoom.unsigned_abs() {
                    session.scroll(zoom.signum(), centre);
                }

                std::fs::write(&output, session.render_svg())
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                info!("Wrote preview to {}", output.display());

                match commit_dir {
                    Some(dir) => Some(session.commit(&dir, &timestamp_now())?),
                    None => None,
                }
            };

            if let (Some(path), true) = (committed, upload) {
                let mut settings = config.moonraker.clone();
                settings.auto_upload = true;
                let host = connect_print_host(&settings).await;
                submit_for_upload(host, path, config.moonraker.auto_start_print)
                    .await
                    .context("Upload task panicked")?;
            }
        }
    }

    Ok(())
}

fn load_config(path: &std::path::Path) -> Result<Config> {
    Config::load_or_create(path).with_context(|| format!("Failed to load {}", path.display()))
}
