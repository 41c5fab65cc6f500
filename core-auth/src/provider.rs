//! Token providers
//!
//! The uploader asks a [`TokenProvider`] for credentials exactly once, when
//! it is constructed. Two providers ship with the crate:
//!
//! - [`StaticTokenProvider`]: credentials passed on the command line or via
//!   the environment
//! - [`FileTokenProvider`]: credentials cached in a JSON file of the form
//!   `{"token": "...", "id": "..."}`
//!
//! Token values never reach a log line.

use async_trait::async_trait;
use core_runtime::logging::{redact_if_sensitive, strip_path};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{AuthError, Result};
use crate::types::AuthData;

/// Source of credentials for the remote subtitle service
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Result<AuthData>;
}

/// Provider returning credentials known up front
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    auth: AuthData,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            auth: AuthData::new(token, user_id),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<AuthData> {
        validate(&self.auth)?;
        debug!(
            user_id = %self.auth.user_id,
            token = %redact_if_sensitive("token", &self.auth.token),
            "Using static credentials"
        );
        Ok(self.auth.clone())
    }
}

/// Provider reading credentials cached in a JSON file
#[derive(Debug, Clone)]
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenProvider for FileTokenProvider {
    async fn get_token(&self) -> Result<AuthData> {
        let raw = core_async::fs::read(&self.path).await.map_err(|source| {
            warn!(
                file = %strip_path(&self.path.to_string_lossy()),
                error = %source,
                "Failed to read token file"
            );
            AuthError::TokenFileUnreadable {
                path: self.path.clone(),
                source,
            }
        })?;

        let auth: AuthData = serde_json::from_slice(&raw).map_err(|e| AuthError::TokenCorrupted {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        validate(&auth)?;

        info!(
            file = %strip_path(&self.path.to_string_lossy()),
            user_id = %auth.user_id,
            "Loaded cached credentials"
        );

        Ok(auth)
    }
}

fn validate(auth: &AuthData) -> Result<()> {
    if auth.token.trim().is_empty() {
        return Err(AuthError::InvalidCredentials("token is empty".to_string()));
    }
    if auth.user_id.as_str().trim().is_empty() {
        return Err(AuthError::InvalidCredentials("user id is empty".to_string()));
    }
    Ok(())
}
