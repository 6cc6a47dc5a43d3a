use async_trait::async_trait;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

use crate::credentials::SpotifyApiCreds;
use crate::downloader::errors::DownloadError;
use crate::downloader::models::{DownloadOptions, DownloadProgress, Service};
use crate::downloader::tools::{locate_client, ClientKind};
use crate::downloader::traits::{ClientAuth, DownloadClient, ProgressSink};
use crate::downloader::utils::{convert_args, format_args, retry_args, run_output_with_timeout};

use super::DEFAULT_CLIENT_TIMEOUT_SECS;

/// Wrapper around the Deezer download client tool.
///
/// Authenticates with an account ARL. Besides native Deezer links the
/// tool also accepts Spotify playlist links and resolves the tracks on
/// Deezer itself, which is what the cross-service fallback path uses;
/// the global Spotify API keys are forwarded for that resolution.
pub struct DeezerClient {
    bin: String,
    timeout_secs: u64,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl DeezerClient {
    pub fn new() -> Self {
        let bin = locate_client(ClientKind::Deezer)
            .unwrap_or_else(|| ClientKind::Deezer.binary_name().to_string());
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

impl Default for DeezerClient {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn build_args(
    url: &str,
    link: Service,
    quality: &str,
    options: &DownloadOptions,
) -> Vec<String> {
    let mut args = vec![
        "playlist".to_string(),
        "--quality".to_string(),
        quality.to_string(),
    ];

    // Spotify links go through the tool's own track resolution, where
    // recursive quality selection is wanted; native Deezer playlists
    // keep per-track qualities instead.
    if link == Service::Spotify {
        args.push("--source".to_string());
        args.push("spotify".to_string());
        args.push("--recursive-quality".to_string());
    }

    args.extend(format_args(options));
    args.extend(retry_args(&options.retry));
    args.extend(convert_args(options));
    args.push(url.to_string());
    args
}

#[async_trait]
impl DownloadClient for DeezerClient {
    fn name(&self) -> &'static str {
        "deezloader"
    }

    fn is_available(&self) -> bool {
        Path::new(&self.bin).exists() || locate_client(ClientKind::Deezer).is_some()
    }

    async fn download_playlist(
        &self,
        url: &str,
        link: Service,
        quality: &str,
        auth: ClientAuth<'_>,
        options: &DownloadOptions,
    ) -> Result<(), DownloadError> {
        let arl = auth.arl.ok_or_else(|| {
            DownloadError::ExecutionError("deezer client invoked without an ARL".to_string())
        })?;

        let args = build_args(url, link, quality, options);
        let mut envs = vec![("DEEZER_ARL".to_string(), arl.to_string())];
        if let Some(SpotifyApiCreds {
            client_id,
            client_secret,
        }) = auth.api
        {
            envs.push(("SPOTIFY_CLIENT_ID".to_string(), client_id.clone()));
            envs.push(("SPOTIFY_CLIENT_SECRET".to_string(), client_secret.clone()));
        }

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
