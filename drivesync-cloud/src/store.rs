//! The remote object-store capability the reconciler depends on.

use crate::error::SyncResult;
use crate::types::{FileQuery, NewRemoteFile, RemoteFile};
use async_trait::async_trait;

/// Remote storage operations used by a sync pass.
///
/// [`crate::api_client::DriveClient`] implements this over HTTP; tests
/// substitute an in-memory store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Verifies the credentials by obtaining an access token.
    async fn authenticate(&self) -> SyncResult<()>;

    /// Lists every file matching the query, across all pages.
    async fn list_files(&self, query: &FileQuery) -> SyncResult<Vec<RemoteFile>>;

    /// Creates a file with the given metadata and content in one request.
    async fn create_file(
        &self,
        metadata: &NewRemoteFile,
        content: Vec<u8>,
        mime_type: &str,
    ) -> SyncResult<RemoteFile>;

    /// Permanently deletes a file. Does not go through the trash.
    async fn delete_file(&self, file_id: &str) -> SyncResult<()>;
}
