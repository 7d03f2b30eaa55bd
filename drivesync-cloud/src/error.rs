//! Sync error types.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while bootstrapping a session or syncing a folder.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("required credential account")]
    MissingCredential,

    #[error("credential account ({0}) not found")]
    CredentialNotFound(String),

    #[error("invalid service account credential: {0}")]
    InvalidCredential(String),

    #[error("directory path ({0}) not found")]
    DirectoryNotFound(String),

    #[error("required folder id")]
    MissingFolderId,

    #[error("file path ({0}) not found")]
    FileNotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("Drive API request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("upload of {name} failed: {source}")]
    Upload {
        name: String,
        #[source]
        source: Box<SyncError>,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
