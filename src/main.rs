use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use playlist_downloader::downloader::tools;
use playlist_downloader::{DownloadRequest, FileCredentialStore, PlaylistDownloader};

const USAGE: &str = "usage: playlist-downloader <url> <main-account> [fallback-account]
       playlist-downloader status

environment:
  CREDS_DIR   credential store root (default: user config dir)
  QUALITY     quality for the primary attempt
  OUTPUT_DIR  download directory (default: ./downloads)";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args().skip(1);
    let first = args.next();

    if first.as_deref() == Some("status") {
        for info in tools::all_clients() {
            println!(
                "{}: {} ({})",
                info.kind.binary_name(),
                if info.is_available { "available" } else { "not installed" },
                info.version.or(info.path).unwrap_or_else(|| "-".to_string()),
            );
        }
        return ExitCode::SUCCESS;
    }

    let (url, main_account) = match (first, args.next()) {
        (Some(url), Some(main_account)) => (url, main_account),
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };
    let fallback = args.next();

    let creds_root = match env::var("CREDS_DIR")
        .ok()
        .map(PathBuf::from)
        .or_else(FileCredentialStore::default_root)
    {
        Some(root) => root,
        None => {
            eprintln!("no credential directory found; set CREDS_DIR");
            return ExitCode::FAILURE;
        }
    };

    let mut request = DownloadRequest::new(url, main_account);
    if let Some(account) = fallback {
        request = request.with_fallback(account);
    }
    if let Ok(quality) = env::var("QUALITY") {
        request = request.with_quality(quality);
    }
    if let Ok(dir) = env::var("OUTPUT_DIR") {
        request.options.output_dir = dir;
    }

    let downloader = PlaylistDownloader::new(Box::new(FileCredentialStore::new(creds_root)));
    match downloader.download_playlist(&request).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
