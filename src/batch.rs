//! Batch pipeline
//!
//! Translates every `*.gcode` file in the input directory by a fixed offset,
//! hands the result to a print host, and archives the source under
//! `processed/`. Files are handled one at a time in name order.

use bedshift_communication::{deliver, MoonrakerClient, NoOpPrintHost, PrintHost};
use bedshift_core::{Offset, Result};
use bedshift_settings::{Config, MoonrakerSettings};
use bedshift_visualizer::utils::{
    fixed_file_name, list_gcode_files, move_to_processed, timestamp_now, translate_file,
    NameStyle,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Everything one batch pass needs to know
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub offset: Offset,
    pub include_timestamp: bool,
    pub auto_upload: bool,
    pub auto_start_print: bool,
}

impl From<&Config> for BatchOptions {
    fn from(config: &Config) -> Self {
        Self {
            input_dir: config.script.input_directory.clone(),
            output_dir: config.script.output_directory.clone(),
            offset: config.offsets.as_offset(),
            include_timestamp: config.script.include_timestamp,
            auto_upload: config.moonraker.auto_upload,
            auto_start_print: config.moonraker.auto_start_print,
        }
    }
}

/// Outcome of one or more passes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Written output files
    pub written: Vec<PathBuf>,
    /// Sources that could not be translated and were left in place
    pub failed: Vec<PathBuf>,
    /// Outputs accepted by the print host
    pub uploaded: usize,
}

impl BatchReport {
    fn merge(&mut self, other: BatchReport) {
        self.written.extend(other.written);
        self.failed.extend(other.failed);
        self.uploaded += other.uploaded;
    }
}

/// Connect to the configured Moonraker instance.
///
/// Falls back to [`NoOpPrintHost`] when uploading is disabled or the host
/// cannot be reached, so a batch never fails for network reasons.
pub async fn connect_print_host(settings: &MoonrakerSettings) -> Arc<dyn PrintHost> {
    if !settings.auto_upload && !settings.auto_start_print {
        return Arc::new(NoOpPrintHost);
    }
    match MoonrakerClient::connect(&settings.url).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!(
                "Failed to connect to Moonraker at {}: {}. Continuing without upload/print functionality.",
                settings.url, e
            );
            Arc::new(NoOpPrintHost)
        }
    }
}

/// Run one pass over `options.input_dir`.
///
/// Only directory-level failures are returned. A file that cannot be
/// translated is logged and stays where it is; upload and print failures are
/// logged and the source is still archived.
pub async fn process_directory(options: &BatchOptions, host: &dyn PrintHost) -> Result<BatchReport> {
    std::fs::create_dir_all(&options.input_dir)?;
    std::fs::create_dir_all(&options.output_dir)?;

    let mut report = BatchReport::default();
    for source in list_gcode_files(&options.input_dir)? {
        let timestamp = options.include_timestamp.then(timestamp_now);
        let name = fixed_file_name(
            &source,
            options.offset,
            timestamp.as_deref(),
            NameStyle::Batch,
        );
        let output = options.output_dir.join(&name);

        if let Err(e) = translate_file(&source, &output, options.offset) {
            error!("Skipping {}: {}", source.display(), e);
            report.failed.push(source);
            continue;
        }
        info!("Processed {} -> {}", display_name(&source), name);

        if options.auto_upload {
            match deliver(host, &output, options.auto_start_print).await {
                Ok(_) => report.uploaded += 1,
                Err(e) => error!("Failed to upload or start print: {}", e),
            }
        } else {
            info!("Auto-upload is disabled. Skipping upload of {}", name);
        }

        move_to_processed(&options.input_dir, &source)?;
        report.written.push(output);
    }

    Ok(report)
}

/// Repeat [`process_directory`] every `interval` until `shutdown` completes
pub async fn watch_directory<F>(
    options: &BatchOptions,
    host: &dyn PrintHost,
    interval: Duration,
    shutdown: F,
) -> Result<BatchReport>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut total = BatchReport::default();

    loop {
        total.merge(process_directory(options, host).await?);

        info!(
            "Waiting {} seconds before checking for new files...",
            interval.as_secs()
        );
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = &mut shutdown => {
                info!("Watch mode stopped");
                break;
            }
        }
    }

    Ok(total)
}

/// Resolve when `signal` fires. If the signal cannot be awaited the error is
/// logged and the returned future never resolves, so watch mode keeps running.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
