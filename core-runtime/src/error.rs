use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// No way to authenticate against the subtitle service was configured
    #[error("Missing credentials ({source_kind}): {message}")]
    MissingCredentials { source_kind: String, message: String },

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
