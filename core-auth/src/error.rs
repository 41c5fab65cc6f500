use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token file {path} could not be read: {source}")]
    TokenFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Token file {path} is malformed: {reason}")]
    TokenCorrupted { path: PathBuf, reason: String },

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, AuthError>;
