//! Local directory scanning.
//!
//! Only direct children that are regular files take part in a sync; nested
//! directories and other special entries are ignored.

use crate::error::{SyncError, SyncResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A regular file in the local directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocalFile {
    /// Base name, used as the remote file name and identity key.
    pub name: String,
    pub path: PathBuf,
    pub mime_type: String,
    pub size: u64,
}

impl LocalFile {
    /// Builds a descriptor for a single file, failing if it is missing or not a regular file.
    pub fn from_path(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let not_found = || SyncError::FileNotFound(path.display().to_string());

        let metadata = std::fs::metadata(path).map_err(|_| not_found())?;
        if !metadata.is_file() {
            return Err(not_found());
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(not_found)?
            .to_string();

        Ok(Self {
            name,
            path: path.to_path_buf(),
            mime_type: detect_mime_type(path),
            size: metadata.len(),
        })
    }
}

/// Guesses the content type from the file extension.
pub fn detect_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
}

/// Lists the regular files directly inside `dir`, sorted by name.
pub fn scan_directory(dir: impl AsRef<Path>) -> SyncResult<Vec<LocalFile>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Err(SyncError::DirectoryNotFound(dir.display().to_string()));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| SyncError::io(dir, e))?;
    let mut files = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| SyncError::io(dir, e))?;
        let path = entry.path();

        // Follows symlinks, so a link to a regular file counts as one.
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!("skipping unreadable entry {}: {e}", path.display());
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!("skipping non UTF-8 file name {}", path.display());
            continue;
        };

        files.push(LocalFile {
            name,
            mime_type: detect_mime_type(&path),
            size: metadata.len(),
            path,
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("found {} local files in {}", files.len(), dir.display());
    Ok(files)
}
