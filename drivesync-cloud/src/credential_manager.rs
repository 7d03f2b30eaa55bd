//! Access-token lifecycle for a service account.
//!
//! Exchanges a signed JWT assertion for an OAuth access token and caches it
//! until shortly before expiry.

use crate::config::{DRIVE_SCOPES, DriveConfig};
use crate::error::{SyncError, SyncResult};
use crate::service_account::ServiceAccountKey;
use crate::types::AccessToken;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// Manages the access token for one service account.
pub struct CredentialManager {
    client: Client,
    key: ServiceAccountKey,
    token_uri: String,
    token: RwLock<Option<AccessToken>>,
    /// Serializes refreshes so concurrent callers share one exchange.
    refresh_lock: Mutex<()>,
    refresh_margin_secs: i64,
}

impl CredentialManager {
    pub fn new(client: Client, key: ServiceAccountKey, config: &DriveConfig) -> Self {
        let token_uri = config
            .token_uri
            .clone()
            .unwrap_or_else(|| key.token_uri.clone());
        Self {
            client,
            key,
            token_uri,
            token: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            refresh_margin_secs: config.token_refresh_margin_secs,
        }
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Gets a valid access token, exchanging a new assertion if needed.
    pub async fn get_token(&self) -> SyncResult<String> {
        // Fast path: cached token still valid
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(token) = self.cached().await {
            return Ok(token);
        }
        Ok(self.refresh().await?.token)
    }

    async fn cached(&self) -> Option<String> {
        let token = self.token.read().await;
        match token.as_ref() {
            Some(t) if !t.expires_within_secs(self.refresh_margin_secs) => Some(t.token.clone()),
            Some(_) => {
                debug!("access token expiring within {}s, refreshing", self.refresh_margin_secs);
                None
            }
            None => None,
        }
    }

    /// Replaces a token the server rejected.
    ///
    /// Runs under the refresh lock; if another caller already swapped the
    /// rejected token for a fresh one, that token is returned without a new exchange.
    pub async fn force_refresh(&self, rejected: &str) -> SyncResult<String> {
        let _guard = self.refresh_lock.lock().await;
        if let Some(token) = self.cached().await {
            if token != rejected {
                return Ok(token);
            }
        }
        Ok(self.refresh().await?.token)
    }

    /// Forces a token exchange.
    pub async fn refresh(&self) -> SyncResult<AccessToken> {
        let assertion = self.key.assertion(&DRIVE_SCOPES, &self.token_uri)?;

        let resp = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("token exchange for {} failed with {status}", self.key.client_email);
            return Err(SyncError::AuthFailed(format!("token endpoint returned {status}: {body}")));
        }

        let resp: TokenResponse = resp.json().await?;
        let token = AccessToken {
            token: resp.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(resp.expires_in),
        };

        debug!(
            "obtained access token for {}, expires at {}",
            self.key.client_email, token.expires_at
        );

        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    /// Drops the cached token.
    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    /// Returns true if a token is cached and outside the refresh margin.
    pub async fn has_valid_token(&self) -> bool {
        self.cached().await.is_some()
    }
}
