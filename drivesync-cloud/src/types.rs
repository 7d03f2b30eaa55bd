//! Shared types for Drive sync operations.

use crate::local::LocalFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Fields requested for every file returned by Drive.
pub const FILE_FIELDS: &str = "id, name, createdTime, mimeType";

/// OAuth access token with its expiry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Returns true if the token will expire within the given seconds.
    pub fn expires_within_secs(&self, secs: i64) -> bool {
        Utc::now() + chrono::Duration::seconds(secs) >= self.expires_at
    }
}

/// A file as returned by the Drive listing and create endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Metadata part of a create request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRemoteFile {
    pub name: String,
    /// Omitted from the request when empty so Drive places the file in root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl NewRemoteFile {
    pub fn new(name: impl Into<String>, parent_ids: &[String]) -> Self {
        Self {
            name: name.into(),
            parents: parent_ids.to_vec(),
        }
    }
}

/// One page of a `files.list` response.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub files: Vec<RemoteFile>,
}

/// Listing filter for the direct, non-folder, non-trashed children of a folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileQuery {
    pub parent_id: String,
    pub exclude_folders: bool,
    pub include_trashed: bool,
    pub order_by: Option<String>,
}

impl FileQuery {
    /// The reconciler's query: files only, not trashed, newest first.
    pub fn in_folder(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            exclude_folders: true,
            include_trashed: false,
            order_by: Some("createdTime desc".to_string()),
        }
    }

    /// Renders the Drive `q` parameter.
    pub fn to_query_string(&self) -> String {
        let mut clauses = Vec::with_capacity(3);
        if self.exclude_folders {
            clauses.push(format!("mimeType != '{FOLDER_MIME_TYPE}'"));
        }
        if !self.include_trashed {
            clauses.push("trashed = false".to_string());
        }
        clauses.push(format!("'{}' in parents", escape_query_literal(&self.parent_id)));
        clauses.join(" and ")
    }
}

/// Escapes a value for use inside a single-quoted Drive query literal.
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// The diff between a local directory and a remote folder.
#[derive(Clone, Debug, Default)]
pub struct SyncPlan {
    /// Remote files with no local counterpart, in listing order.
    pub to_delete: Vec<RemoteFile>,
    /// Local files with no remote counterpart, in enumeration order.
    pub to_upload: Vec<LocalFile>,
    /// Names present on both sides.
    pub unchanged: Vec<String>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_upload.is_empty()
    }
}

/// Outcome of a successful sync pass.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SyncReport {
    pub uploaded: Vec<RemoteFile>,
    pub deleted: Vec<RemoteFile>,
    /// Remote-only files the deletion guard refused to delete.
    pub skipped_deletes: Vec<RemoteFile>,
    pub unchanged: Vec<String>,
    pub dry_run: bool,
    /// Dry run only: local names that would be uploaded.
    pub would_upload: Vec<String>,
    /// Dry run only: remote files that would be deleted.
    pub would_delete: Vec<RemoteFile>,
}

impl SyncReport {
    /// Describes a plan without touching the remote.
    pub fn planned(plan: SyncPlan) -> Self {
        Self {
            unchanged: plan.unchanged,
            dry_run: true,
            would_upload: plan.to_upload.into_iter().map(|f| f.name).collect(),
            would_delete: plan.to_delete,
            ..Default::default()
        }
    }

    /// Number of remote mutations performed.
    pub fn change_count(&self) -> usize {
        self.uploaded.len() + self.deleted.len()
    }
}
