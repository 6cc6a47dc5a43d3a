use async_trait::async_trait;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{DownloadOptions, DownloadProgress, Service};
use crate::downloader::tools::{locate_client, ClientKind};
use crate::downloader::traits::{ClientAuth, DownloadClient, ProgressSink};
use crate::downloader::utils::{convert_args, format_args, retry_args, run_output_with_timeout};

use super::DEFAULT_CLIENT_TIMEOUT_SECS;

/// Wrapper around the Spotify download client tool.
///
/// Authentication uses a serialized blob file plus the global API
/// keys; both are forwarded, never interpreted here.
pub struct SpotifyClient {
    bin: String,
    timeout_secs: u64,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl SpotifyClient {
    pub fn new() -> Self {
        let bin = locate_client(ClientKind::Spotify)
            .unwrap_or_else(|| ClientKind::Spotify.binary_name().to_string());
        Self {
            bin,
            timeout_secs: DEFAULT_CLIENT_TIMEOUT_SECS,
            progress: None,
        }
    }

    pub fn with_bin(mut self, bin: impl Into<String>) -> Self {
        self.bin = bin.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    fn emit(&self, percent: f32, status: &str) {
        if let Some(sink) = &self.progress {
            sink.emit(DownloadProgress {
                percent,
                status: status.to_string(),
            });
        }
    }
}

impl Default for SpotifyClient {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn build_args(
    url: &str,
    quality: &str,
    blob: &Path,
    options: &DownloadOptions,
) -> Vec<String> {
    let mut args = vec![
        "playlist".to_string(),
        "--credentials".to_string(),
        blob.to_string_lossy().to_string(),
        "--quality".to_string(),
        quality.to_string(),
    ];

    if options.real_time {
        args.push("--real-time".to_string());
    }

    args.extend(format_args(options));
    args.extend(retry_args(&options.retry));
    args.extend(convert_args(options));
    args.push(url.to_string());
    args
}

#[async_trait]
impl DownloadClient for SpotifyClient {
    fn name(&self) -> &'static str {
        "spotloader"
    }

    fn is_available(&self) -> bool {
        Path::new(&self.bin).exists() || locate_client(ClientKind::Spotify).is_some()
    }

    async fn download_playlist(
        &self,
        url: &str,
        link: Service,
        quality: &str,
        auth: ClientAuth<'_>,
        options: &DownloadOptions,
    ) -> Result<(), DownloadError> {
        if link != Service::Spotify {
            return Err(DownloadError::ExecutionError(format!(
                "{} only handles spotify links, got {}",
                self.name(),
                link
            )));
        }

        let blob = auth.blob_file_path.ok_or_else(|| {
            DownloadError::ExecutionError("spotify client invoked without an auth blob".to_string())
        })?;
        let api = auth.api.ok_or(DownloadError::MissingApiCreds)?;

        let args = build_args(url, quality, blob, options);
        let envs = vec![
            ("SPOTIFY_CLIENT_ID".to_string(), api.client_id.clone()),
            ("SPOTIFY_CLIENT_SECRET".to_string(), api.client_secret.clone()),
        ];

        debug!("{} {}", self.bin, args.join(" "));
        self.emit(0.0, "Starting playlist download");

        let output = run_output_with_timeout(&self.bin, args, envs, self.timeout_secs).await?;
        if output.status.success() {
            info!("{} finished playlist {}", self.name(), url);
            self.emit(100.0, "Playlist download complete");
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            Err(DownloadError::ExecutionError(format!(
                "{} exited with {}",
                self.name(),
                output.status
            )))
        } else {
            Err(stderr.into())
        }
    }
}
