// Common data models for the dispatch layer

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default quality for attempts that go through the Deezer client.
pub const DEFAULT_DEEZER_QUALITY: &str = "FLAC";

/// Default quality for attempts that go through the Spotify client.
pub const DEFAULT_SPOTIFY_QUALITY: &str = "HIGH";

/// Which external service a playlist URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Service {
    Spotify,
    Deezer,
}

impl Service {
    /// Classify a URL by hostname substring.
    ///
    /// `open.spotify.com` links map to Spotify, `deezer.com` links
    /// (including `link.deezer.com` share links) map to Deezer.
    /// Anything else is unsupported.
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.to_lowercase();
        if lower.contains("open.spotify.com") {
            Some(Self::Spotify)
        } else if lower.contains("deezer.com") {
            Some(Self::Deezer)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::Deezer => "deezer",
        }
    }

    /// Default download quality when the request does not specify one
    pub fn default_quality(&self) -> &'static str {
        match self {
            Self::Spotify => DEFAULT_SPOTIFY_QUALITY,
            Self::Deezer => DEFAULT_DEEZER_QUALITY,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

lazy_static! {
    static ref SPOTIFY_PLAYLIST_RE: Regex =
        Regex::new(r"open\.spotify\.com/(?:[a-zA-Z0-9-]+/)?playlist/([A-Za-z0-9]+)").unwrap();
    static ref DEEZER_PLAYLIST_RE: Regex =
        Regex::new(r"deezer\.com/(?:[a-z]{2}/)?playlist/(\d+)").unwrap();
}

/// Extract the playlist id from a supported URL (for logging and
/// diagnostics; the full URL is what gets forwarded to the clients).
pub fn playlist_id(url: &str) -> Option<String> {
    SPOTIFY_PLAYLIST_RE
        .captures(url)
        .or_else(|| DEEZER_PLAYLIST_RE.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Retry tuning forwarded verbatim to the external clients.
/// This layer never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Seconds before the first retry inside the client
    pub initial_retry_delay: u64,
    /// Seconds added to the delay after each failed attempt
    pub retry_delay_increase: u64,
    /// Maximum retries the client should perform
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_retry_delay: 5,
            retry_delay_increase: 5,
            max_retries: 3,
        }
    }
}

/// Download options forwarded to whichever client handles the request
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Directory the client writes into
    pub output_dir: String,
    /// Directory layout template, in the clients' placeholder syntax
    pub custom_dir_format: String,
    /// Track filename template, in the clients' placeholder syntax
    pub custom_track_format: String,
    /// Zero-pad track numbers in filenames
    pub pad_tracks: bool,
    /// Save playlist/album cover art next to the tracks
    pub save_cover: bool,
    /// Optional output conversion target (e.g. "MP3", "OGG")
    pub convert_to: Option<String>,
    /// Bitrate for conversion, client-defined syntax (e.g. "320k")
    pub bitrate: Option<String>,
    /// Real-time pacing of the download (Spotify client only)
    pub real_time: bool,
    pub retry: RetryPolicy,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: "./downloads".to_string(),
            custom_dir_format: "%ar_album%/%album%/%copyright%".to_string(),
            custom_track_format: "%tracknum%. %music% - %artist%".to_string(),
            pad_tracks: true,
            save_cover: true,
            convert_to: None,
            bitrate: None,
            real_time: false,
            retry: RetryPolicy::default(),
        }
    }
}

impl DownloadOptions {
    pub fn with_output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_dir_format(mut self, format: impl Into<String>) -> Self {
        self.custom_dir_format = format.into();
        self
    }

    pub fn with_track_format(mut self, format: impl Into<String>) -> Self {
        self.custom_track_format = format.into();
        self
    }

    pub fn with_pad_tracks(mut self, enabled: bool) -> Self {
        self.pad_tracks = enabled;
        self
    }

    pub fn with_save_cover(mut self, enabled: bool) -> Self {
        self.save_cover = enabled;
        self
    }

    pub fn with_conversion(mut self, format: impl Into<String>, bitrate: Option<String>) -> Self {
        self.convert_to = Some(format.into());
        self.bitrate = bitrate;
        self
    }

    pub fn with_real_time(mut self, enabled: bool) -> Self {
        self.real_time = enabled;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// A single playlist download request
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Playlist URL (Spotify or Deezer)
    pub url: String,
    /// Account name for the service the URL belongs to
    pub main: String,
    /// Optional Deezer account tried first when the URL is a Spotify link
    pub fallback: Option<String>,
    /// Quality for the primary attempt; service default when None
    pub quality: Option<String>,
    /// Quality for the fallback attempt; service default when None
    pub fall_quality: Option<String>,
    /// Skip the duplicate-task check (set when the queue worker itself
    /// is the caller and has already claimed the URL)
    pub skip_duplicate_check: bool,
    pub options: DownloadOptions,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, main: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            main: main.into(),
            fallback: None,
            quality: None,
            fall_quality: None,
            skip_duplicate_check: false,
            options: DownloadOptions::default(),
        }
    }

    pub fn with_fallback(mut self, account: impl Into<String>) -> Self {
        self.fallback = Some(account.into());
        self
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn with_fall_quality(mut self, quality: impl Into<String>) -> Self {
        self.fall_quality = Some(quality.into());
        self
    }

    pub fn with_options(mut self, options: DownloadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn skipping_duplicate_check(mut self) -> Self {
        self.skip_duplicate_check = true;
        self
    }
}

/// Coarse progress information forwarded to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub percent: f32,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_from_spotify_url() {
        let url = "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M";
        assert_eq!(Service::from_url(url), Some(Service::Spotify));
    }

    #[test]
    fn test_service_from_deezer_url() {
        assert_eq!(
            Service::from_url("https://www.deezer.com/en/playlist/1479458365"),
            Some(Service::Deezer)
        );
        assert_eq!(
            Service::from_url("https://link.deezer.com/s/abcDEF123"),
            Some(Service::Deezer)
        );
    }

    #[test]
    fn test_service_detection_is_case_insensitive() {
        assert_eq!(
            Service::from_url("https://OPEN.SPOTIFY.COM/playlist/ABC"),
            Some(Service::Spotify)
        );
        assert_eq!(
            Service::from_url("https://www.DEEZER.com/playlist/42"),
            Some(Service::Deezer)
        );
    }

    #[test]
    fn test_unsupported_urls_are_rejected() {
        assert_eq!(
            Service::from_url("https://music.youtube.com/playlist?list=x"),
            None
        );
        assert_eq!(Service::from_url("not a url"), None);
        // Track links from the Spotify domain still classify; the clients
        // decide whether the link kind itself is supported.
        assert_eq!(
            Service::from_url("https://open.spotify.com/track/abc"),
            Some(Service::Spotify)
        );
    }

    #[test]
    fn test_playlist_id_extraction() {
        assert_eq!(
            playlist_id("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=x"),
            Some("37i9dQZF1DXcBWIGoYBM5M".to_string())
        );
        assert_eq!(
            playlist_id("https://open.spotify.com/intl-fr/playlist/37i9dQZF1DXcBWIGoYBM5M"),
            Some("37i9dQZF1DXcBWIGoYBM5M".to_string())
        );
        assert_eq!(
            playlist_id("https://www.deezer.com/en/playlist/1479458365"),
            Some("1479458365".to_string())
        );
        assert_eq!(playlist_id("https://www.deezer.com/en/album/123"), None);
    }

    #[test]
    fn test_default_qualities() {
        assert_eq!(Service::Deezer.default_quality(), "FLAC");
        assert_eq!(Service::Spotify.default_quality(), "HIGH");
    }

    #[test]
    fn test_request_builders() {
        let request = DownloadRequest::new("https://deezer.com/playlist/1", "main")
            .with_fallback("dz-fallback")
            .with_quality("MP3_320")
            .skipping_duplicate_check();

        assert_eq!(request.fallback.as_deref(), Some("dz-fallback"));
        assert_eq!(request.quality.as_deref(), Some("MP3_320"));
        assert!(request.skip_duplicate_check);
        assert_eq!(request.options.retry, RetryPolicy::default());
    }
}
