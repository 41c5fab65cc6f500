use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The service answered with a status the protocol does not accept
    #[error("Remote service rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The dedup lookup was refused; the unit cannot decide whether to create
    #[error("Existence lookup failed with status {status}: {body}")]
    LookupFailed { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] BridgeError),

    #[error("Malformed payload: {0}")]
    Decode(String),

    #[error("Invalid record {sha1}: {reason}")]
    InvalidRecord { sha1: String, reason: String },

    #[error("Record source error: {0}")]
    Source(BridgeError),
}

impl SyncError {
    /// Whether this is an expected refusal by the remote service rather than
    /// an internal fault
    pub fn is_rejection(&self) -> bool {
        matches!(self, SyncError::Rejected { .. })
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Rejected { status, .. } | SyncError::LookupFailed { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        let rejected = SyncError::Rejected {
            status: 500,
            body: "boom".to_string(),
        };
        assert!(rejected.is_rejection());
        assert_eq!(rejected.status(), Some(500));

        let transport = SyncError::from(BridgeError::Timeout("http://x".to_string()));
        assert!(!transport.is_rejection());
        assert_eq!(transport.status(), None);

        let invalid = SyncError::InvalidRecord {
            sha1: "abc".to_string(),
            reason: "missing series_id".to_string(),
        };
        assert!(!invalid.is_rejection());
        assert!(invalid.to_string().contains("missing series_id"));

        let lookup = SyncError::LookupFailed {
            status: 502,
            body: String::new(),
        };
        assert!(!lookup.is_rejection());
        assert_eq!(lookup.status(), Some(502));
    }
}
