//! HTTP client for the Google Drive v3 files API.
//!
//! Handles bearer authentication with a single retry on 401, paginated
//! listings, multipart uploads and permanent deletes.

use crate::config::DriveConfig;
use crate::credential_manager::CredentialManager;
use crate::error::{SyncError, SyncResult};
use crate::store::RemoteStore;
use crate::types::{FILE_FIELDS, FileList, FileQuery, NewRemoteFile, RemoteFile};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Drive files API bound to one service account.
pub struct DriveClient {
    client: Client,
    config: DriveConfig,
    credentials: Arc<CredentialManager>,
}

impl DriveClient {
    pub fn new(client: Client, config: DriveConfig, credentials: Arc<CredentialManager>) -> Self {
        Self {
            client,
            config,
            credentials,
        }
    }

    /// Sends an authorized request, refreshing the token and retrying once on 401.
    async fn send_authorized<F>(&self, label: &str, build: F) -> SyncResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let token = self.credentials.get_token().await?;
        let resp = build().bearer_auth(&token).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            debug!("401 on {label}, refreshing token");
            let token = self.credentials.force_refresh(&token).await?;
            return Ok(build().bearer_auth(&token).send().await?);
        }

        Ok(resp)
    }

    async fn list_page(
        &self,
        query: &FileQuery,
        page_token: Option<&str>,
    ) -> SyncResult<FileList> {
        let url = self.config.files_url();
        let q = query.to_query_string();
        let fields = format!("nextPageToken, files({FILE_FIELDS})");
        let page_size = self.config.page_size.to_string();

        let mut params: Vec<(&str, &str)> = vec![
            ("q", q.as_str()),
            ("fields", fields.as_str()),
            ("pageSize", page_size.as_str()),
        ];
        if let Some(order_by) = query.order_by.as_deref() {
            params.push(("orderBy", order_by));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let resp = self
            .send_authorized("files.list", || self.client.get(&url).query(&params))
            .await?;
        Ok(check_status(resp).await?.json().await?)
    }
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn authenticate(&self) -> SyncResult<()> {
        self.credentials.get_token().await.map(|_| ())
    }

    async fn list_files(&self, query: &FileQuery) -> SyncResult<Vec<RemoteFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(query, page_token.as_deref()).await?;
            files.extend(page.files);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("listed {} remote files in {}", files.len(), query.parent_id);
        Ok(files)
    }

    async fn create_file(
        &self,
        metadata: &NewRemoteFile,
        content: Vec<u8>,
        mime_type: &str,
    ) -> SyncResult<RemoteFile> {
        let url = self.config.upload_url();
        let boundary = format!("drivesync-{}", Uuid::new_v4().simple());
        let size = content.len();
        let body = multipart_related_body(&boundary, metadata, &content, mime_type)?;
        let content_type = format!("multipart/related; boundary={boundary}");

        let resp = self
            .send_authorized("files.create", || {
                self.client
                    .post(&url)
                    .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
                    .header(reqwest::header::CONTENT_TYPE, content_type.as_str())
                    .body(body.clone())
            })
            .await?;

        let created: RemoteFile = check_status(resp).await?.json().await?;
        debug!("uploaded {size} bytes as {} ({})", created.name, created.id);
        Ok(created)
    }

    async fn delete_file(&self, file_id: &str) -> SyncResult<()> {
        let url = format!("{}/{}", self.config.files_url(), urlencoding::encode(file_id));
        let resp = self
            .send_authorized("files.delete", || self.client.delete(&url))
            .await?;
        check_status(resp).await?;
        debug!("deleted remote file {file_id}");
        Ok(())
    }
}

/// Maps a non-success response to [`SyncError::Api`], using Google's error message when present.
async fn check_status(resp: Response) -> SyncResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    Err(SyncError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Builds a `multipart/related` body: JSON metadata part, then the media part.
fn multipart_related_body(
    boundary: &str,
    metadata: &NewRemoteFile,
    content: &[u8],
    mime_type: &str,
) -> SyncResult<Vec<u8>> {
    let metadata = serde_json::to_string(metadata)?;
    let mut body = Vec::with_capacity(content.len() + metadata.len() + 256);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Ok(body)
}
