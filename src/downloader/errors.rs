// Error types for the dispatch layer and client wrappers

use std::path::PathBuf;
use thiserror::Error;

use super::models::Service;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// URL matched neither open.spotify.com nor deezer.com
    #[error("invalid URL (must be from open.spotify.com or deezer.com): {0}")]
    InvalidUrl(String),

    /// A download for this URL is already tracked by the task queue
    #[error("download for this URL is already in progress (task {task_id})")]
    DuplicateDownload { task_id: String },

    /// No stored credentials for this service/account pair
    #[error("no {service} credentials found for account '{account}'")]
    CredentialNotFound { service: Service, account: String },

    /// Stored credentials exist but lack a required field
    #[error("{service} credentials for account '{account}' are missing '{field}'")]
    MissingCredential {
        service: Service,
        account: String,
        field: &'static str,
    },

    /// Spotify auth blob path points at a file that does not exist
    #[error("credentials blob not found at {} for account '{account}'", path.display())]
    CredentialFileNotFound { account: String, path: PathBuf },

    /// Global Spotify client_id/client_secret not configured
    #[error("global Spotify API credentials (client_id/secret) not configured")]
    MissingApiCreds,

    /// External client binary not installed or not on PATH
    #[error("client tool not found: {0}")]
    ClientNotFound(String),

    /// Service rejected the client (429, quota exceeded)
    #[error("rate limited by the service: {0}")]
    RateLimited(String),

    /// Client could not authenticate (expired ARL, invalid blob)
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Client process exceeded the configured timeout
    #[error("timed out: {0}")]
    Timeout(String),

    /// Failed to parse client output
    #[error("parse error: {0}")]
    ParseError(String),

    /// Client process failed to start or exited non-zero
    #[error("execution error: {0}")]
    ExecutionError(String),

    /// Cross-service path exhausted: Deezer attempt and Spotify
    /// direct attempt both failed
    #[error("both attempts failed; deezer: {deezer}; spotify: {spotify}")]
    BothAttemptsFailed { deezer: String, spotify: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Unknown(String),
}

// Classify raw client stderr into error kinds
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("429")
            || lower.contains("rate limit")
            || lower.contains("quota exceeded")
            || lower.contains("too many requests")
        {
            return Self::RateLimited(s);
        }

        if lower.contains("401")
            || lower.contains("unauthorized")
            || lower.contains("invalid arl")
            || lower.contains("arl expired")
            || lower.contains("bad credentials")
            || lower.contains("login failed")
        {
            return Self::AuthFailed(s);
        }

        if lower.contains("timed out") || lower.contains("timeout") {
            return Self::Timeout(s);
        }

        if lower.contains("command not found")
            || lower.contains("no such file")
            || lower.contains("not found")
        {
            return Self::ClientNotFound(s);
        }

        if lower.contains("parse") || lower.contains("json") {
            return Self::ParseError(s);
        }

        Self::Unknown(s)
    }
}

impl From<&str> for DownloadError {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}
