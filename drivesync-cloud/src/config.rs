//! Drive client configuration.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};

/// OAuth scopes requested for the service account: full Drive read/write.
pub const DRIVE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/drive.file",
];

/// Configuration for the Drive client and token exchange.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Base URL for metadata calls (`/drive/v3/files`).
    pub api_base_url: String,

    /// Base URL for media uploads (`/upload/drive/v3/files`).
    pub upload_base_url: String,

    /// Token endpoint override. `None` uses the `token_uri` from the key file.
    pub token_uri: Option<String>,

    /// Page size for file listings (Drive caps this at 1000).
    pub page_size: u32,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Refresh the access token this many seconds before it expires.
    pub token_refresh_margin_secs: i64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com".to_string(),
            upload_base_url: "https://www.googleapis.com".to_string(),
            token_uri: None,
            page_size: 100,
            request_timeout_secs: 30,
            token_refresh_margin_secs: 60,
        }
    }
}

impl DriveConfig {
    /// Points every endpoint at a single base URL (used against mock servers).
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            api_base_url: base.clone(),
            upload_base_url: base.clone(),
            token_uri: Some(format!("{base}/token")),
            ..Default::default()
        }
    }

    /// Rejects values Drive would refuse or that make every request fail.
    pub fn validate(&self) -> SyncResult<()> {
        if !(1..=1000).contains(&self.page_size) {
            return Err(SyncError::Config(format!(
                "page_size must be between 1 and 1000, got {}",
                self.page_size
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(SyncError::Config("request_timeout_secs must be positive".into()));
        }
        if self.token_refresh_margin_secs < 0 {
            return Err(SyncError::Config(
                "token_refresh_margin_secs must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.api_base_url.trim_end_matches('/'))
    }

    pub(crate) fn upload_url(&self) -> String {
        format!(
            "{}/upload/drive/v3/files",
            self.upload_base_url.trim_end_matches('/')
        )
    }
}
