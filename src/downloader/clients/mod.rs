// Wrappers around the external download client tools

pub mod deezer;
pub mod spotify;

pub use deezer::DeezerClient;
pub use spotify::SpotifyClient;

/// Hard cap on a single client run. Playlist downloads are long; the
/// clients own per-track retries, this only catches a wedged process.
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 6 * 60 * 60;
