//! One-way sync of a local directory into a Google Drive folder.
//!
//! Provides:
//! - Service-account authentication (JWT bearer → access token, cached)
//! - A Drive v3 files client (list, multipart upload, delete)
//! - Flat directory scanning with content-type detection
//! - A reconciler that uploads missing files and deletes remote-only ones

pub mod api_client;
pub mod config;
pub mod credential_manager;
pub mod error;
pub mod local;
pub mod reconciler;
pub mod service_account;
pub mod session;
pub mod store;
pub mod types;

pub use config::DriveConfig;
pub use error::{SyncError, SyncResult};
pub use local::LocalFile;
pub use reconciler::{AllowDeletes, DeletionGuard, DenyDeletes, FolderReconciler, SyncOptions, UploadSource};
pub use session::DriveSession;
pub use store::RemoteStore;
pub use types::*;
