// Download client trait definition

use async_trait::async_trait;
use std::path::Path;

use super::errors::DownloadError;
use super::models::{DownloadOptions, DownloadProgress, Service};
use crate::credentials::SpotifyApiCreds;

/// Credentials resolved for a single client invocation.
///
/// Clients are stateless wrappers around external tools, so secrets are
/// passed per call rather than held on the client; each client pulls
/// out the pieces it needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientAuth<'a> {
    /// Deezer ARL token
    pub arl: Option<&'a str>,
    /// Path to the Spotify auth blob
    pub blob_file_path: Option<&'a Path>,
    /// Global Spotify API keys
    pub api: Option<&'a SpotifyApiCreds>,
}

impl<'a> ClientAuth<'a> {
    pub fn with_arl(arl: &'a str, api: Option<&'a SpotifyApiCreds>) -> Self {
        Self {
            arl: Some(arl),
            blob_file_path: None,
            api,
        }
    }

    pub fn with_blob(blob: &'a Path, api: &'a SpotifyApiCreds) -> Self {
        Self {
            arl: None,
            blob_file_path: Some(blob),
            api: Some(api),
        }
    }
}

/// Trait for wrappers around the external download client tools
#[async_trait]
pub trait DownloadClient: Send + Sync {
    /// Name of the client (for logging)
    fn name(&self) -> &'static str;

    /// Whether the underlying tool is installed
    fn is_available(&self) -> bool;

    /// Download every track of a playlist.
    ///
    /// `link` is the service the URL belongs to, which is not
    /// necessarily the client's own service: the Deezer client also
    /// accepts Spotify links and resolves them itself.
    async fn download_playlist(
        &self,
        url: &str,
        link: Service,
        quality: &str,
        auth: ClientAuth<'_>,
        options: &DownloadOptions,
    ) -> Result<(), DownloadError>;
}

/// Sink for coarse progress updates
pub trait ProgressSink: Send + Sync {
    fn emit(&self, progress: DownloadProgress);
}
