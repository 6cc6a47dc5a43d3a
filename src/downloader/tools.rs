// Discovery of the external client binaries

use log::debug;
use serde::{Deserialize, Serialize};
use std::process::Command;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClientKind {
    Spotify,
    Deezer,
}

impl ClientKind {
    pub fn binary_name(&self) -> &'static str {
        match self {
            ClientKind::Spotify => "spotloader",
            ClientKind::Deezer => "deezloader",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub kind: ClientKind,
    pub version: Option<String>,
    pub path: Option<String>,
    pub is_available: bool,
}

/// Resolve the binary for a client, preferring well-known install
/// locations over PATH lookup.
pub fn locate_client(kind: ClientKind) -> Option<String> {
    let binary_name = kind.binary_name();

    let common_paths = [
        format!("/opt/homebrew/bin/{}", binary_name),
        format!("/usr/local/bin/{}", binary_name),
        format!("/usr/bin/{}", binary_name),
    ];

    for path in common_paths {
        if std::path::Path::new(&path).exists() {
            debug!("found {} at {}", binary_name, path);
            return Some(path);
        }
    }

    if let Ok(output) = Command::new("which").arg(binary_name).output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                debug!("found {} on PATH at {}", binary_name, path);
                return Some(path);
            }
        }
    }

    None
}

/// Probe a resolved binary for its version string
pub fn client_version(path: &str) -> Option<String> {
    match Command::new(path).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let out = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if out.is_empty() {
                None
            } else {
                Some(out)
            }
        }
        _ => None,
    }
}

/// Availability snapshot for one client
pub fn client_info(kind: ClientKind) -> ClientInfo {
    let path = locate_client(kind);
    let version = path.as_deref().and_then(client_version);
    ClientInfo {
        kind,
        version,
        is_available: path.is_some(),
        path,
    }
}

/// Availability snapshot for both clients
pub fn all_clients() -> Vec<ClientInfo> {
    vec![client_info(ClientKind::Spotify), client_info(ClientKind::Deezer)]
}
