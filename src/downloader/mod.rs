// Downloader module - dispatch layer over the external client tools

pub mod clients;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod tools;
pub mod traits;
pub mod utils;

pub use errors::DownloadError;
pub use models::{DownloadOptions, DownloadProgress, DownloadRequest, RetryPolicy, Service};
pub use orchestrator::PlaylistDownloader;
pub use traits::{ClientAuth, DownloadClient, ProgressSink};
