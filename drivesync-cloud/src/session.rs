//! Session bootstrap: credential file → token manager → Drive client.

use crate::api_client::DriveClient;
use crate::config::DriveConfig;
use crate::credential_manager::CredentialManager;
use crate::error::{SyncError, SyncResult};
use crate::reconciler::FolderReconciler;
use crate::service_account::ServiceAccountKey;
use crate::store::RemoteStore;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// An authenticated Drive session.
///
/// Construction only reads the key file; the first remote call performs the
/// token exchange.
pub struct DriveSession {
    credentials: Arc<CredentialManager>,
    drive: Arc<DriveClient>,
}

impl DriveSession {
    /// Loads the service-account key at `credential_path` and builds the Drive handles.
    pub fn initialize(credential_path: impl AsRef<Path>, config: DriveConfig) -> SyncResult<Self> {
        let credential_path = credential_path.as_ref();
        if credential_path.as_os_str().is_empty() {
            return Err(SyncError::MissingCredential);
        }
        if !credential_path.exists() {
            return Err(SyncError::CredentialNotFound(
                credential_path.display().to_string(),
            ));
        }

        config.validate()?;

        let key = ServiceAccountKey::from_file(credential_path)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!("initialized Drive session for {}", key.client_email);

        let credentials = Arc::new(CredentialManager::new(client.clone(), key, &config));
        let drive = Arc::new(DriveClient::new(client, config, Arc::clone(&credentials)));

        Ok(Self { credentials, drive })
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    pub fn drive(&self) -> &Arc<DriveClient> {
        &self.drive
    }

    /// Performs the token exchange now instead of on first use.
    pub async fn authenticate(&self) -> SyncResult<()> {
        self.drive.authenticate().await
    }

    /// A reconciler backed by this session's Drive client.
    pub fn reconciler(&self) -> FolderReconciler<DriveClient> {
        FolderReconciler::new(Arc::clone(&self.drive))
    }
}
