//! One-way folder reconciliation.
//!
//! A pass lists the local directory and the remote folder, deletes remote
//! files whose name has no local counterpart, then uploads local files whose
//! name is missing remotely. Names are the only identity key: a file present
//! on both sides is never compared or refreshed.
//!
//! Calls are made one at a time. Deletions run first, in listing order, then
//! uploads in local enumeration order. The first failure ends the pass.

use crate::error::{SyncError, SyncResult};
use crate::local::{LocalFile, scan_directory};
use crate::store::RemoteStore;
use crate::types::{FileQuery, NewRemoteFile, RemoteFile, SyncPlan, SyncReport};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decides whether a remote-only file may be deleted.
///
/// Drive deletes bypass the trash, so a rejected deletion is the only way to
/// keep a remote-only file.
pub trait DeletionGuard: Send + Sync {
    fn confirm(&self, file: &RemoteFile) -> bool;

    /// Interactive guards are not consulted during a dry run.
    fn is_interactive(&self) -> bool {
        false
    }
}

/// Deletes every remote-only file.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowDeletes;

impl DeletionGuard for AllowDeletes {
    fn confirm(&self, _file: &RemoteFile) -> bool {
        true
    }
}

/// Never deletes; remote-only files are reported as skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct DenyDeletes;

impl DeletionGuard for DenyDeletes {
    fn confirm(&self, _file: &RemoteFile) -> bool {
        false
    }
}

/// Options for a sync pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyncOptions {
    /// Compute the plan but leave the remote untouched.
    pub dry_run: bool,
}

/// What to upload: a path to resolve, or an already-scanned file.
#[derive(Clone, Debug)]
pub enum UploadSource {
    Path(PathBuf),
    File(LocalFile),
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for UploadSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<LocalFile> for UploadSource {
    fn from(file: LocalFile) -> Self {
        Self::File(file)
    }
}

impl UploadSource {
    fn resolve(self) -> SyncResult<LocalFile> {
        match self {
            Self::Path(path) => LocalFile::from_path(path),
            Self::File(file) => Ok(file),
        }
    }
}

/// Reconciles a local directory into a remote folder.
pub struct FolderReconciler<S: RemoteStore + ?Sized> {
    store: Arc<S>,
    guard: Arc<dyn DeletionGuard>,
    options: SyncOptions,
}

impl<S: RemoteStore + ?Sized> FolderReconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            guard: Arc::new(AllowDeletes),
            options: SyncOptions::default(),
        }
    }

    pub fn with_guard(mut self, guard: impl DeletionGuard + 'static) -> Self {
        self.guard = Arc::new(guard);
        self
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Computes the diff between `local_dir` and the folder without mutating anything.
    pub async fn plan(&self, local_dir: impl AsRef<Path>, folder_id: &str) -> SyncResult<SyncPlan> {
        let local = scan_directory(local_dir)?;
        if folder_id.is_empty() {
            return Err(SyncError::MissingFolderId);
        }

        let remote = self.store.list_files(&FileQuery::in_folder(folder_id)).await?;
        Ok(diff(local, remote))
    }

    /// Makes the folder's direct file names match the directory's regular file names.
    pub async fn sync_folder(
        &self,
        local_dir: impl AsRef<Path>,
        folder_id: &str,
    ) -> SyncResult<SyncReport> {
        let local_dir = local_dir.as_ref();
        let plan = self.plan(local_dir, folder_id).await?;

        if self.options.dry_run {
            let mut plan = plan;
            let mut skipped = Vec::new();
            if !self.guard.is_interactive() {
                let (keep, refused): (Vec<_>, Vec<_>) = plan
                    .to_delete
                    .into_iter()
                    .partition(|f| self.guard.confirm(f));
                plan.to_delete = keep;
                skipped = refused;
            }
            info!(
                "dry run for {}: {} to upload, {} to delete, {} kept",
                local_dir.display(),
                plan.to_upload.len(),
                plan.to_delete.len(),
                skipped.len()
            );
            let mut report = SyncReport::planned(plan);
            report.skipped_deletes = skipped;
            return Ok(report);
        }

        let mut report = SyncReport {
            unchanged: plan.unchanged,
            ..Default::default()
        };

        for file in plan.to_delete {
            if !self.guard.confirm(&file) {
                warn!("keeping remote-only file {} ({}): deletion not confirmed", file.name, file.id);
                report.skipped_deletes.push(file);
                continue;
            }
            self.store.delete_file(&file.id).await?;
            info!("deleted remote file {} ({})", file.name, file.id);
            report.deleted.push(file);
        }

        let parents = [folder_id.to_string()];
        for file in plan.to_upload {
            let name = file.name.clone();
            let created = self
                .upload(file, &parents)
                .await
                .map_err(|e| SyncError::Upload {
                    name,
                    source: Box::new(e),
                })?;
            report.uploaded.push(created);
        }

        info!(
            "synced {} into {folder_id}: {} uploaded, {} deleted, {} unchanged",
            local_dir.display(),
            report.uploaded.len(),
            report.deleted.len(),
            report.unchanged.len()
        );
        Ok(report)
    }

    /// Uploads one file in a single request, placing it under `parent_ids` if any are given.
    pub async fn upload(
        &self,
        source: impl Into<UploadSource>,
        parent_ids: &[String],
    ) -> SyncResult<RemoteFile> {
        let file = source.into().resolve()?;
        let content = tokio::fs::read(&file.path)
            .await
            .map_err(|e| SyncError::io(&file.path, e))?;

        let metadata = NewRemoteFile::new(file.name.as_str(), parent_ids);
        let created = self
            .store
            .create_file(&metadata, content, &file.mime_type)
            .await?;

        info!("uploaded {} as {}", file.name, created.id);
        Ok(created)
    }
}

/// Splits local and remote listings into deletions, uploads and matches.
///
/// Matching is exact and case-sensitive. A local name is matched at most
/// once, so later remote duplicates of the same name are deleted.
pub fn diff(local: Vec<LocalFile>, remote: Vec<RemoteFile>) -> SyncPlan {
    let mut pending: HashSet<String> = local.iter().map(|f| f.name.clone()).collect();
    let mut plan = SyncPlan::default();

    for file in remote {
        if pending.remove(&file.name) {
            plan.unchanged.push(file.name);
        } else {
            plan.to_delete.push(file);
        }
    }

    plan.to_upload = local
        .into_iter()
        .filter(|f| pending.contains(&f.name))
        .collect();

    debug!(
        "plan: {} uploads, {} deletions, {} unchanged",
        plan.to_upload.len(),
        plan.to_delete.len(),
        plan.unchanged.len()
    );
    plan
}
