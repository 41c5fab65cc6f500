//! # Remote Sync Protocol
//!
//! The three round-trips the uploader makes against the subtitle service:
//!
//! 1. `GET /api/files/sha1/{sha1}` - does the service already have this file?
//! 2. `POST /api/files` - create the file entity
//! 3. `POST /api/dialogs/bulk` - create its dialogs, a slice at a time
//!
//! Every request carries the bearer token of the [`AuthData`] the API was
//! built with. A non-success status comes back as
//! [`SyncError::Rejected`], except for the 404 of the existence lookup, which
//! is the normal "not uploaded yet" answer ([`FileLookup::Absent`]).

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::records::{DialogLine, SubtitleRecord};
use core_auth::{AuthData, TokenProvider, UserId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, trace};

use crate::models::{BulkDialogCreate, DialogCreate, FileCreate, RemoteDialog, RemoteFile};
use crate::{Result, SyncError};

pub use core_runtime::config::DEFAULT_UPLOAD_SLICE;

/// Timeout of one bulk dialog request
pub const BULK_UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of the existence lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLookup {
    Found(RemoteFile),
    Absent,
}

impl FileLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, FileLookup::Found(_))
    }

    pub fn into_found(self) -> Option<RemoteFile> {
        match self {
            FileLookup::Found(file) => Some(file),
            FileLookup::Absent => None,
        }
    }
}

/// Client for the remote subtitle service.
///
/// Stateless apart from its credentials: one instance is shared by every
/// concurrently running upload.
pub struct SubtitleApi {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    auth: AuthData,
    upload_slice: usize,
}

impl SubtitleApi {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>, auth: AuthData) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
            auth,
            upload_slice: DEFAULT_UPLOAD_SLICE,
        }
    }

    /// Build the API with credentials fetched once from `provider`
    pub async fn from_provider(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        provider: &dyn TokenProvider,
    ) -> core_auth::Result<Self> {
        let auth = provider.get_token().await?;
        Ok(Self::new(http_client, base_url, auth))
    }

    /// Slice size used when `upload_dialogs` is called with 0
    pub fn with_upload_slice(mut self, slice: usize) -> Self {
        self.upload_slice = slice.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_id(&self) -> &UserId {
        &self.auth.user_id
    }

    pub fn upload_slice(&self) -> usize {
        self.upload_slice
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{}", self.base_url, path))
            .bearer_token(&self.auth.token)
            .header("Accept", "application/json")
    }

    fn with_json<T: Serialize>(request: HttpRequest, body: &T) -> Result<HttpRequest> {
        request
            .json(body)
            .map_err(|e| SyncError::Decode(format!("request body: {}", e)))
    }

    fn rejection(response: &HttpResponse) -> SyncError {
        SyncError::Rejected {
            status: response.status,
            body: response.text_lossy(),
        }
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
        serde_json::from_slice(&response.body)
            .map_err(|e| SyncError::Decode(format!("status {} response: {}", response.status, e)))
    }

    /// Look a file up by content hash
    #[instrument(skip(self))]
    pub async fn get_file(&self, sha1: &str) -> Result<FileLookup> {
        let request = self.request(HttpMethod::Get, &format!("/api/files/sha1/{}", sha1));
        let response = self.http_client.execute(request).await?;

        if response.is_not_found() {
            trace!("File not uploaded yet");
            return Ok(FileLookup::Absent);
        }
        if !response.is_success() {
            return Err(Self::rejection(&response));
        }

        let file: RemoteFile = Self::decode(&response)?;
        Ok(FileLookup::Found(file))
    }

    /// Create the file entity for `record`
    ///
    /// The record must belong to a series; a record without one is reported
    /// as [`SyncError::InvalidRecord`] without contacting the service.
    #[instrument(skip_all, fields(sha1 = %record.sha1))]
    pub async fn upload_file(&self, record: &SubtitleRecord) -> Result<RemoteFile> {
        let series_id = record
            .series_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SyncError::InvalidRecord {
                sha1: record.sha1.clone(),
                reason: "record has no series_id".to_string(),
            })?;

        let body = FileCreate {
            filename: record.filename.clone(),
            sha1: record.sha1.clone(),
            series_id: series_id.to_string(),
            remark: record.path.clone(),
            user_id: self.auth.user_id.clone(),
        };
        let request = Self::with_json(self.request(HttpMethod::Post, "/api/files"), &body)?;
        let response = self.http_client.execute(request).await?;

        if !matches!(response.status, 200 | 201) {
            return Err(Self::rejection(&response));
        }

        let file: RemoteFile = Self::decode(&response)?;
        debug!(file_id = %file.id, filename = %record.filename, "File synced upstream");
        Ok(file)
    }

    /// Create `dialogs` under `file_id`, `slice` dialogs per request
    ///
    /// Slices are sent one after another in input order. When a slice fails
    /// the error is returned as is; slices already accepted stay on the
    /// service.
    #[instrument(skip(self, dialogs), fields(total = dialogs.len()))]
    pub async fn upload_dialogs(
        &self,
        file_id: &str,
        dialogs: &[DialogLine],
        slice: usize,
    ) -> Result<Vec<RemoteDialog>> {
        let slice = if slice == 0 { self.upload_slice } else { slice };
        let total = dialogs.len();
        let mut created = Vec::with_capacity(total);

        for (index, chunk) in dialogs.chunks(slice).enumerate() {
            let offset_begin = index * slice;
            let offset_end = offset_begin + chunk.len();

            let body = BulkDialogCreate {
                bulk: chunk
                    .iter()
                    .map(|dialog| DialogCreate {
                        file_id: file_id.to_string(),
                        content: dialog.content.clone(),
                        begin: dialog.begin,
                        end: dialog.end,
                        user_id: self.auth.user_id.clone(),
                    })
                    .collect(),
            };
            let request = Self::with_json(
                self.request(HttpMethod::Post, "/api/dialogs/bulk")
                    .timeout(BULK_UPLOAD_TIMEOUT),
                &body,
            )?;
            let response = self.http_client.execute(request).await?;

            if !response.is_success() {
                return Err(Self::rejection(&response));
            }

            let batch: Vec<RemoteDialog> = Self::decode(&response)?;
            debug!(
                file_id,
                offset_begin,
                offset_end,
                total,
                "Dialog batch synced upstream"
            );
            created.extend(batch);
        }

        Ok(created)
    }

    /// Release the shared transport
    pub async fn close(&self) {
        self.http_client.close().await;
    }
}
