//! # Sync Configuration Module
//!
//! Provides configuration management for the subtitle uploader.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `SyncConfig`
//! instance that holds every setting needed to run one upload batch. It
//! enforces fail-fast validation so a bad URL or a zero parallelism is
//! reported before any record is read or any request is sent.
//!
//! ## Required Settings
//!
//! - `base_url` - Root of the remote subtitle service (http or https)
//! - `database_path` - Local subtitle database to read records from
//! - `token` - Where the bearer token and user id come from
//!
//! ## Optional Settings (with defaults)
//!
//! - `parallel` - Concurrent upload units (default: 2)
//! - `upload_slice` - Dialogs per bulk request (default: 400)
//! - `range` - Record window to process (default: every record)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{SyncConfig, TokenSource};
//!
//! let config = SyncConfig::builder()
//!     .base_url("https://subs.example.com")
//!     .database_path("/data/subtitles.db")
//!     .token(TokenSource::File("/secrets/token.json".into()))
//!     .parallel(4)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::SyncConfig;
//!
//! // Missing the token source
//! let config = SyncConfig::builder()
//!     .base_url("https://subs.example.com")
//!     .database_path("/data/subtitles.db")
//!     .build()
//!     .expect("Should fail - no token source");
//! ```

use crate::error::{Error, Result};
use bridge_traits::RecordRange;
use std::fmt;
use std::path::PathBuf;

/// Default number of concurrently running upload units
pub const DEFAULT_PARALLEL: usize = 2;

/// Default number of dialogs per bulk-create request
pub const DEFAULT_UPLOAD_SLICE: usize = 400;

/// Where the uploader obtains its credentials.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Token and user id given directly (CLI flags or environment)
    Static { token: String, user_id: String },
    /// JSON file holding `{ "token": "...", "id": "..." }`
    File(PathBuf),
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Static { user_id, .. } => f
                .debug_struct("Static")
                .field("token", &"[REDACTED]")
                .field("user_id", user_id)
                .finish(),
            TokenSource::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

/// Settings for one upload batch.
///
/// Use [`SyncConfigBuilder`] to construct instances.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Service root without a trailing slash
    pub base_url: String,

    /// Path to the local SQLite subtitle database
    pub database_path: PathBuf,

    /// Maximum number of records uploaded at the same time
    pub parallel: usize,

    /// Maximum number of dialogs sent per bulk request
    pub upload_slice: usize,

    /// Window of records to process
    pub range: RecordRange,

    /// Credential source
    pub token: TokenSource,
}

impl SyncConfig {
    /// Creates a new builder for constructing a `SyncConfig`.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Base URL uses http or https and has a host
    /// - Database path is not empty
    /// - Parallelism and slice size are at least 1
    /// - The record window is not inverted
    /// - Static credentials are not blank
    pub fn validate(&self) -> Result<()> {
        validate_base_url(&self.base_url)?;

        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        if self.parallel == 0 {
            return Err(Error::Config(
                "Parallelism must be at least 1. Pass --parallel 1 to upload sequentially."
                    .to_string(),
            ));
        }

        if self.upload_slice == 0 {
            return Err(Error::Config(
                "Upload slice must be at least 1 dialog per request".to_string(),
            ));
        }

        if !self.range.is_unbounded() && self.range.end < self.range.begin {
            return Err(Error::Config(format!(
                "Record range end ({}) is before begin ({}). Use end = 0 for no upper bound.",
                self.range.end, self.range.begin
            )));
        }

        match &self.token {
            TokenSource::Static { token, user_id } => {
                if token.trim().is_empty() {
                    return Err(Error::Config(
                        "Token cannot be empty. Pass --token or set SUBSYNC_TOKEN.".to_string(),
                    ));
                }
                if user_id.trim().is_empty() {
                    return Err(Error::Config(
                        "User id cannot be empty. Pass --user-id or set SUBSYNC_USER_ID."
                            .to_string(),
                    ));
                }
            }
            TokenSource::File(path) => {
                if path.as_os_str().is_empty() {
                    return Err(Error::Config("Token file path cannot be empty".to_string()));
                }
            }
        }

        Ok(())
    }
}

fn validate_base_url(url: &str) -> Result<()> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| {
            Error::Config(format!(
                "Base URL '{}' must start with http:// or https://",
                url
            ))
        })?;

    if rest.is_empty() || rest.starts_with('/') {
        return Err(Error::Config(format!("Base URL '{}' has no host", url)));
    }

    Ok(())
}

fn token_source_missing_error() -> Error {
    Error::MissingCredentials {
        source_kind: "token".to_string(),
        message: "Credentials are required to talk to the subtitle service. \
                 Pass --token together with --user-id (or SUBSYNC_TOKEN / SUBSYNC_USER_ID), \
                 or point --token-file at a JSON file with 'token' and 'id' fields."
            .to_string(),
    }
}

/// Builder for constructing [`SyncConfig`] instances.
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    base_url: Option<String>,
    database_path: Option<PathBuf>,
    parallel: Option<usize>,
    upload_slice: Option<usize>,
    range: RecordRange,
    token: Option<TokenSource>,
}

impl SyncConfigBuilder {
    /// Sets the service root. Trailing slashes are removed.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the database path.
    ///
    /// ```
    /// use core_runtime::config::SyncConfig;
    ///
    /// let builder = SyncConfig::builder()
    ///     .database_path("/data/subtitles.db");
    /// ```
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Sets the number of concurrent upload units.
    ///
    /// Default: 2
    pub fn parallel(mut self, parallel: usize) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Sets the number of dialogs per bulk request.
    ///
    /// Default: 400
    pub fn upload_slice(mut self, slice: usize) -> Self {
        self.upload_slice = Some(slice);
        self
    }

    /// Restricts the batch to records `[begin, end)`; `end == 0` means no upper bound.
    pub fn range(mut self, range: RecordRange) -> Self {
        self.range = range;
        self
    }

    /// Sets the credential source (required).
    pub fn token(mut self, source: TokenSource) -> Self {
        self.token = Some(source);
        self
    }

    /// Builds the final `SyncConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(SyncConfig)` on success, or an error if:
    /// - A required setting is missing
    /// - Configuration values are invalid
    pub fn build(self) -> Result<SyncConfig> {
        let base_url = self.base_url.ok_or_else(|| {
            Error::Config("Base URL is required. Use .base_url() to set it.".to_string())
        })?;

        let database_path = self.database_path.ok_or_else(|| {
            Error::Config("Database path is required. Use .database_path() to set it.".to_string())
        })?;

        let token = self.token.ok_or_else(token_source_missing_error)?;

        let base_url = base_url.trim();
        validate_base_url(base_url)?;

        let config = SyncConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            database_path,
            parallel: self.parallel.unwrap_or(DEFAULT_PARALLEL),
            upload_slice: self.upload_slice.unwrap_or(DEFAULT_UPLOAD_SLICE),
            range: self.range,
            token,
        };

        config.validate()?;

        Ok(config)
    }
}
