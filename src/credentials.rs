// Credential lookup for the external download clients
//
// Accounts are stored one directory per service/account pair:
//   <root>/deezer/<account>/credentials.json   -> { "arl": "..." }
//   <root>/spotify/<account>/credentials.json  -> { "blob_file_path": "..." }
// Global Spotify API keys live in <root>/search.json.

use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::downloader::errors::DownloadError;
use crate::downloader::models::Service;

/// Deezer account secrets
#[derive(Debug, Clone)]
pub struct DeezerCredentials {
    /// ARL session token consumed by the Deezer client
    pub arl: String,
}

/// Spotify account secrets
#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    /// Path to the serialized auth blob consumed by the Spotify client
    pub blob_file_path: PathBuf,
}

/// Global Spotify API keys, shared by both clients
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyApiCreds {
    pub client_id: String,
    pub client_secret: String,
}

/// Lookup seam over wherever account secrets actually live
pub trait CredentialStore: Send + Sync {
    fn deezer(&self, account: &str) -> Result<DeezerCredentials, DownloadError>;
    fn spotify(&self, account: &str) -> Result<SpotifyCredentials, DownloadError>;

    /// Global API keys; None when not configured (callers decide how
    /// hard that failure is)
    fn spotify_api_creds(&self) -> Option<SpotifyApiCreds>;
}

#[derive(Debug, Deserialize)]
struct RawDeezerCredentials {
    #[serde(default)]
    arl: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSpotifyCredentials {
    #[serde(default)]
    blob_file_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawApiCreds {
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    client_secret: Option<String>,
}

/// JSON-file backed credential store
pub struct FileCredentialStore {
    root: PathBuf,
}

impl FileCredentialStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Conventional location under the user config directory
    pub fn default_root() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("playlist-downloader").join("creds"))
    }

    fn account_file(&self, service: Service, account: &str) -> PathBuf {
        self.root
            .join(service.as_str())
            .join(account)
            .join("credentials.json")
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DownloadError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl CredentialStore for FileCredentialStore {
    fn deezer(&self, account: &str) -> Result<DeezerCredentials, DownloadError> {
        let path = self.account_file(Service::Deezer, account);
        if !path.exists() {
            return Err(DownloadError::CredentialNotFound {
                service: Service::Deezer,
                account: account.to_string(),
            });
        }

        let raw: RawDeezerCredentials = Self::read_json(&path)?;
        match raw.arl {
            Some(arl) if !arl.trim().is_empty() => Ok(DeezerCredentials { arl }),
            _ => Err(DownloadError::MissingCredential {
                service: Service::Deezer,
                account: account.to_string(),
                field: "arl",
            }),
        }
    }

    fn spotify(&self, account: &str) -> Result<SpotifyCredentials, DownloadError> {
        let path = self.account_file(Service::Spotify, account);
        if !path.exists() {
            return Err(DownloadError::CredentialNotFound {
                service: Service::Spotify,
                account: account.to_string(),
            });
        }

        let raw: RawSpotifyCredentials = Self::read_json(&path)?;
        match raw.blob_file_path {
            Some(blob) if !blob.trim().is_empty() => Ok(SpotifyCredentials {
                blob_file_path: PathBuf::from(blob),
            }),
            _ => Err(DownloadError::MissingCredential {
                service: Service::Spotify,
                account: account.to_string(),
                field: "blob_file_path",
            }),
        }
    }

    fn spotify_api_creds(&self) -> Option<SpotifyApiCreds> {
        let path = self.root.join("search.json");
        let raw: RawApiCreds = match Self::read_json(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("could not read global API keys from {}: {}", path.display(), e);
                return None;
            }
        };

        match (raw.client_id, raw.client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some(SpotifyApiCreds {
                    client_id: id,
                    client_secret: secret,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_with(service: &str, account: &str, json: &str) -> (TempDir, FileCredentialStore) {
        let dir = TempDir::new().unwrap();
        let account_dir = dir.path().join(service).join(account);
        fs::create_dir_all(&account_dir).unwrap();
        fs::write(account_dir.join("credentials.json"), json).unwrap();
        let store = FileCredentialStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_deezer_lookup() {
        let (_dir, store) = store_with("deezer", "main", r#"{"arl": "abc123"}"#);
        let creds = store.deezer("main").unwrap();
        assert_eq!(creds.arl, "abc123");
    }

    #[test]
    fn test_missing_account_is_distinct_from_missing_field() {
        let (_dir, store) = store_with("deezer", "main", r#"{"arl": ""}"#);

        let err = store.deezer("other").unwrap_err();
        assert!(matches!(err, DownloadError::CredentialNotFound { .. }));

        let err = store.deezer("main").unwrap_err();
        assert!(matches!(
            err,
            DownloadError::MissingCredential { field: "arl", .. }
        ));
    }

    #[test]
    fn test_spotify_lookup() {
        let (_dir, store) = store_with(
            "spotify",
            "alice",
            r#"{"blob_file_path": "/tmp/blob.json"}"#,
        );
        let creds = store.spotify("alice").unwrap();
        assert_eq!(creds.blob_file_path, PathBuf::from("/tmp/blob.json"));
    }

    #[test]
    fn test_spotify_without_blob_path() {
        let (_dir, store) = store_with("spotify", "alice", r#"{"username": "alice"}"#);
        let err = store.spotify("alice").unwrap_err();
        assert!(matches!(
            err,
            DownloadError::MissingCredential {
                field: "blob_file_path",
                ..
            }
        ));
    }

    #[test]
    fn test_api_creds_from_search_json() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("search.json"),
            r#"{"client_id": "id", "client_secret": "secret"}"#,
        )
        .unwrap();
        let store = FileCredentialStore::new(dir.path());

        let api = store.spotify_api_creds().unwrap();
        assert_eq!(api.client_id, "id");
        assert_eq!(api.client_secret, "secret");
    }

    #[test]
    fn test_api_creds_absent_or_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path());
        assert!(store.spotify_api_creds().is_none());

        fs::write(
            dir.path().join("search.json"),
            r#"{"client_id": "", "client_secret": ""}"#,
        )
        .unwrap();
        assert!(store.spotify_api_creds().is_none());
    }
}
