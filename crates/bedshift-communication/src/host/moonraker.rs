//! Moonraker HTTP client
//!
//! Talks to the Moonraker API server of a Klipper printer:
//! - `GET /printer/info` for host information
//! - `POST /server/files/upload` (multipart, field `file`) to store a program
//! - `POST /printer/print/start?filename=` to print it

use super::{url_friendly_name, HostInfo, PrintHost};
use async_trait::async_trait;
use bedshift_core::constants::DEFAULT_MOONRAKER_PORT;
use bedshift_core::{ConnectionError, Result};
use reqwest::{multipart, StatusCode, Url};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: T,
}

fn http_error(e: reqwest::Error) -> ConnectionError {
    ConnectionError::Http {
        reason: e.to_string(),
    }
}

/// Client bound to one Moonraker instance
#[derive(Debug, Clone)]
pub struct MoonrakerClient {
    base_url: Url,
    http: reqwest::Client,
}

impl MoonrakerClient {
    /// Validate `url` and build a client. No request is made.
    ///
    /// A scheme (`http` or `https`) and a host are required. Without an
    /// explicit port, 7125 is used.
    pub fn new(url: &str) -> std::result::Result<Self, ConnectionError> {
        let invalid = |reason: &str| ConnectionError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let mut base_url = Url::parse(url.trim()).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if base_url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host"));
        }
        if base_url.port().is_none() {
            base_url
                .set_port(Some(DEFAULT_MOONRAKER_PORT))
                .map_err(|_| invalid("cannot set port"))?;
        }
        base_url.set_path("/");
        base_url.set_query(None);

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(http_error)?;

        Ok(Self { base_url, http })
    }

    /// Validate `url` and check the host answers
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Self::new(url)?;
        info!("Attempting to connect to Moonraker at {}", client.base_url);
        let host = client.host_info().await?;
        info!(
            "Connected to Moonraker at {} (host: {}, state: {})",
            client.base_url, host.hostname, host.state
        );
        Ok(client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ConnectionError> {
        self.base_url
            .join(path)
            .map_err(|e| ConnectionError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl PrintHost for MoonrakerClient {
    async fn host_info(&self) -> Result<HostInfo> {
        let url = self.endpoint("printer/info")?;
        let response = self.http.get(url).send().await.map_err(http_error)?;
        if !response.status().is_success() {
            return Err(ConnectionError::RpcFailed {
                method: "printer.info".to_string(),
                reason: format!("HTTP {}", response.status()),
            }
            .into());
        }
        let envelope: RpcEnvelope<HostInfo> = response.json().await.map_err(http_error)?;
        Ok(envelope.result)
    }

    async fn upload(&self, path: &Path) -> Result<String> {
        let original = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let remote_name = url_friendly_name(&original);

        let bytes = tokio::fs::read(path).await?;
        let part = multipart::Part::bytes(bytes).file_name(remote_name.clone());
        let form = multipart::Form::new().part("file", part);

        let url = self.endpoint("server/files/upload")?;
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectionError::UploadRejected {
                file_name: remote_name,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        info!("Uploaded {} to printer as {}", original, remote_name);
        Ok(remote_name)
    }

    async fn start_print(&self, remote_name: &str) -> Result<()> {
        let url = self.endpoint("printer/print/start")?;
        let response = self
            .http
            .post(url)
            .query(&[("filename", remote_name)])
            .send()
            .await
            .map_err(http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectionError::RpcFailed {
                method: "printer.print.start".to_string(),
                reason: format!("HTTP {}: {}", status, body),
            }
            .into());
        }

        info!("Started printing {}", remote_name);
        Ok(())
    }
}
