// Dispatch orchestrator with cross-service fallback
//
// Strategy:
// 1. Deezer URL: Deezer client with the main account's ARL
// 2. Spotify URL, no fallback account: Spotify client with the main
//    account's auth blob
// 3. Spotify URL with a Deezer fallback account: Deezer client first
//    (resolving the Spotify link itself), Spotify client second
// No retries here; retry tuning is forwarded to the clients.

use log::{debug, error, info, warn};

use super::clients::{DeezerClient, SpotifyClient};
use super::errors::DownloadError;
use super::models::{playlist_id, DownloadRequest, Service};
use super::traits::{ClientAuth, DownloadClient};
use crate::credentials::{CredentialStore, SpotifyApiCreds};
use crate::queue::{NoopTaskRegistry, TaskRegistry};

pub struct PlaylistDownloader {
    spotify: Box<dyn DownloadClient>,
    deezer: Box<dyn DownloadClient>,
    credentials: Box<dyn CredentialStore>,
    registry: Box<dyn TaskRegistry>,
}

impl PlaylistDownloader {
    pub fn new(credentials: Box<dyn CredentialStore>) -> Self {
        Self {
            spotify: Box::new(SpotifyClient::new()),
            deezer: Box::new(DeezerClient::new()),
            credentials,
            registry: Box::new(NoopTaskRegistry),
        }
    }

    pub fn with_registry(mut self, registry: Box<dyn TaskRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_spotify_client(mut self, client: Box<dyn DownloadClient>) -> Self {
        self.spotify = client;
        self
    }

    pub fn with_deezer_client(mut self, client: Box<dyn DownloadClient>) -> Self {
        self.deezer = client;
        self
    }

    /// Download a playlist, dispatching on the URL's service.
    ///
    /// Every failure is logged here before propagating, so callers that
    /// drop the error still leave a trace.
    pub async fn download_playlist(&self, request: &DownloadRequest) -> Result<(), DownloadError> {
        let result = self.dispatch(request).await;
        if let Err(e) = &result {
            error!("playlist download failed: {}", e);
        }
        result
    }

    async fn dispatch(&self, request: &DownloadRequest) -> Result<(), DownloadError> {
        if !request.skip_duplicate_check {
            if let Some(task_id) = self.registry.existing_task_id(&request.url) {
                return Err(DownloadError::DuplicateDownload { task_id });
            }
        }

        let service = Service::from_url(&request.url)
            .ok_or_else(|| DownloadError::InvalidUrl(request.url.clone()))?;
        debug!(
            "service determined from URL: {} (playlist {})",
            service,
            playlist_id(&request.url).unwrap_or_else(|| "?".to_string())
        );
        debug!(
            "accounts: main='{}', fallback={:?}",
            request.main, request.fallback
        );

        let api = self.credentials.spotify_api_creds();
        if api.is_none() {
            warn!("global Spotify client_id/secret not configured; Spotify operations will likely fail");
        }

        match service {
            Service::Deezer => self.deezer_direct(request, api.as_ref()).await,
            Service::Spotify => match request.fallback.as_deref() {
                Some(fallback) => {
                    self.spotify_with_fallback(request, fallback, api.as_ref())
                        .await
                }
                None => {
                    self.spotify_direct(request, request.quality.as_deref(), api.as_ref())
                        .await
                }
            },
        }
    }

    /// Deezer URL: single direct attempt with the main account's ARL
    async fn deezer_direct(
        &self,
        request: &DownloadRequest,
        api: Option<&SpotifyApiCreds>,
    ) -> Result<(), DownloadError> {
        let quality = request
            .quality
            .as_deref()
            .unwrap_or_else(|| Service::Deezer.default_quality());
        info!(
            "deezer URL; direct download with account '{}' at {}",
            request.main, quality
        );

        let creds = self.credentials.deezer(&request.main)?;
        let auth = ClientAuth::with_arl(&creds.arl, api);
        self.deezer
            .download_playlist(&request.url, Service::Deezer, quality, auth, &request.options)
            .await
    }

    /// Spotify URL: single direct attempt with the main account's blob
    async fn spotify_direct(
        &self,
        request: &DownloadRequest,
        quality: Option<&str>,
        api: Option<&SpotifyApiCreds>,
    ) -> Result<(), DownloadError> {
        let quality = quality.unwrap_or_else(|| Service::Spotify.default_quality());
        let api = api.ok_or(DownloadError::MissingApiCreds)?;
        info!(
            "spotify direct download with account '{}' at {}",
            request.main, quality
        );

        let creds = self.credentials.spotify(&request.main)?;
        if !creds.blob_file_path.exists() {
            return Err(DownloadError::CredentialFileNotFound {
                account: request.main.clone(),
                path: creds.blob_file_path,
            });
        }

        let auth = ClientAuth::with_blob(&creds.blob_file_path, api);
        self.spotify
            .download_playlist(&request.url, Service::Spotify, quality, auth, &request.options)
            .await
    }

    /// Spotify URL with a Deezer fallback account: Deezer first, then
    /// Spotify direct. A credential-lookup failure on the Deezer side
    /// counts as a failed first attempt, not a hard error.
    async fn spotify_with_fallback(
        &self,
        request: &DownloadRequest,
        fallback: &str,
        api: Option<&SpotifyApiCreds>,
    ) -> Result<(), DownloadError> {
        let quality = request
            .quality
            .as_deref()
            .unwrap_or_else(|| Service::Deezer.default_quality());
        let fall_quality = request.fall_quality.as_deref();

        info!(
            "spotify URL; attempt 1 via deezer (account '{}', {})",
            fallback, quality
        );
        let deezer_error = match self
            .deezer_for_spotify(request, fallback, quality, api)
            .await
        {
            Ok(()) => {
                info!(
                    "playlist download via deezer (account '{}') succeeded for spotify URL",
                    fallback
                );
                return Ok(());
            }
            Err(e) => {
                error!(
                    "deezer attempt (account '{}') for spotify URL failed: {}",
                    fallback, e
                );
                e
            }
        };

        info!(
            "attempt 2: spotify direct download (account '{}' for blob)",
            request.main
        );
        match self.spotify_direct(request, fall_quality, api).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(
                    "spotify direct download (account '{}') also failed: {}",
                    request.main, e
                );
                Err(DownloadError::BothAttemptsFailed {
                    deezer: deezer_error.to_string(),
                    spotify: e.to_string(),
                })
            }
        }
    }

    async fn deezer_for_spotify(
        &self,
        request: &DownloadRequest,
        fallback: &str,
        quality: &str,
        api: Option<&SpotifyApiCreds>,
    ) -> Result<(), DownloadError> {
        let creds = self.credentials.deezer(fallback)?;
        let auth = ClientAuth::with_arl(&creds.arl, api);
        self.deezer
            .download_playlist(&request.url, Service::Spotify, quality, auth, &request.options)
            .await
    }
}
