//! Service-account key files and JWT bearer assertions.

use crate::error::{SyncError, SyncResult};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for each assertion. Google rejects anything above one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// A Google service-account JSON key.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

// Keeps the private key out of logs.
impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    /// Reads and validates a key file.
    pub fn from_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SyncError::InvalidCredential(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> SyncResult<Self> {
        let key: Self = serde_json::from_str(raw)
            .map_err(|e| SyncError::InvalidCredential(format!("malformed key file: {e}")))?;

        if key.key_type != "service_account" {
            return Err(SyncError::InvalidCredential(format!(
                "expected a service_account key, got {}",
                key.key_type
            )));
        }
        if key.client_email.is_empty() {
            return Err(SyncError::InvalidCredential("client_email is empty".into()));
        }
        key.encoding_key()?;
        Ok(key)
    }

    fn encoding_key(&self) -> SyncResult<EncodingKey> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| SyncError::InvalidCredential(format!("bad private key: {e}")))
    }

    /// Signs an RS256 assertion for the given scopes and audience.
    pub fn assertion(&self, scopes: &[&str], audience: &str) -> SyncResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: scopes.join(" "),
            aud: audience,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key()?)?)
    }
}
