//! File helpers for manifest hashing and the install stamp.

use std::{
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::lib::errors::LaunchError;

/// Record of the last successful dependency install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallStamp {
    pub manifest: PathBuf,
    pub sha256: String,
    pub installed_at: DateTime<Utc>,
}

/// Return the SHA256 of any file as a hex string.
pub fn compute_sha256(path: &Path) -> Result<String, LaunchError> {
    let mut file = File::open(path).map_err(|source| LaunchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer).map_err(|source| LaunchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Read a stamp file. A missing or unreadable stamp is treated as absent.
pub fn read_install_stamp(path: &Path) -> Option<InstallStamp> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write a stamp file, creating its parent directory.
pub fn write_install_stamp(path: &Path, stamp: &InstallStamp) -> Result<(), LaunchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| LaunchError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let payload = serde_json::to_string_pretty(stamp).map_err(|err| LaunchError::Io {
        path: path.to_path_buf(),
        source: err.into(),
    })?;
    fs::write(path, payload).map_err(|source| LaunchError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns true when every path exists.
pub fn all_exist(paths: &[&Path]) -> bool {
    paths.iter().all(|path| path.exists())
}
