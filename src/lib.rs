// Playlist download dispatcher: URL sniffing, credential lookup and a
// two-level fallback cascade over external Spotify/Deezer client tools.

pub mod credentials;
pub mod downloader;
pub mod queue;

pub use credentials::{CredentialStore, FileCredentialStore, SpotifyApiCreds};
pub use downloader::{
    DownloadError, DownloadOptions, DownloadRequest, PlaylistDownloader, RetryPolicy, Service,
};
pub use queue::{InMemoryTaskRegistry, TaskRegistry};
