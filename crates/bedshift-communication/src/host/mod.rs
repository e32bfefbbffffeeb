//! Print host abstraction
//!
//! A [`PrintHost`] accepts a translated file and can start printing it.
//! [`deliver`] chains the two steps; [`submit_for_upload`] runs the same chain
//! on a background task and only logs failures.

pub mod moonraker;

use async_trait::async_trait;
use bedshift_core::Result;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Information reported by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostInfo {
    pub hostname: String,
    pub state: String,
    pub software_version: String,
}

/// Something that can receive and print G-code files
#[async_trait]
pub trait PrintHost: Send + Sync {
    /// Query host information
    async fn host_info(&self) -> Result<HostInfo>;

    /// Upload a local file. Returns the name it was stored under.
    async fn upload(&self, path: &Path) -> Result<String>;

    /// Start printing a previously uploaded file
    async fn start_print(&self, remote_name: &str) -> Result<()>;
}

/// Host used when uploading is disabled or no connection could be made
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPrintHost;

#[async_trait]
impl PrintHost for NoOpPrintHost {
    async fn host_info(&self) -> Result<HostInfo> {
        Ok(HostInfo {
            hostname: "offline".to_string(),
            ..HostInfo::default()
        })
    }

    async fn upload(&self, path: &Path) -> Result<String> {
        let name = path
            .file_name()
            .map(|n| url_friendly_name(&n.to_string_lossy()))
            .unwrap_or_default();
        debug!("Upload disabled, skipping {}", path.display());
        Ok(name)
    }

    async fn start_print(&self, remote_name: &str) -> Result<()> {
        debug!("Upload disabled, not starting {}", remote_name);
        Ok(())
    }
}

/// Replace every character outside `[A-Za-z0-9_-.]` with `_`
pub fn url_friendly_name(name: &str) -> String {
    static UNSAFE_CHARS: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let regex =
        UNSAFE_CHARS.get_or_init(|| Regex::new(r"[^A-Za-z0-9_\-.]").expect("invalid regex pattern"));
    regex.replace_all(name, "_").into_owned()
}

/// Upload `path` and optionally start printing it
pub async fn deliver(host: &dyn PrintHost, path: &Path, start_print: bool) -> Result<String> {
    let remote = host.upload(path).await?;
    if start_print {
        info!("Starting print of {}", remote);
        host.start_print(&remote).await?;
    }
    Ok(remote)
}

/// Fire-and-forget delivery. Errors are logged, never returned.
///
/// Must be called from within a tokio runtime. The handle may be awaited to
/// wait for completion; dropping it leaves the task running.
pub fn submit_for_upload(
    host: Arc<dyn PrintHost>,
    path: PathBuf,
    start_print: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = deliver(host.as_ref(), &path, start_print).await {
            error!("Failed to upload or start print of {}: {}", path.display(), e);
        }
    })
}
