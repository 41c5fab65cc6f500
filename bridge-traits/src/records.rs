//! Local Subtitle Records
//!
//! The local store indexes subtitle files and the dialog lines parsed out of
//! them. The uploader only ever reads it, through [`RecordSource`].

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// One dialog line of a subtitle file.
///
/// `begin` and `end` are offsets from the start of the media, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogLine {
    pub content: String,
    pub begin: i64,
    pub end: i64,
}

impl DialogLine {
    pub fn new(content: impl Into<String>, begin: i64, end: i64) -> Self {
        Self {
            content: content.into(),
            begin,
            end,
        }
    }
}

/// A locally indexed subtitle file together with its dialog lines.
///
/// The content hash is the identity used for de-duplication against the
/// remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleRecord {
    /// SHA-1 of the subtitle file content
    pub sha1: String,
    pub filename: String,
    /// Remote series identifier; files without one cannot be uploaded
    pub series_id: Option<String>,
    /// Human readable series name, used as a progress label
    pub series_name: Option<String>,
    /// Path of the file on the machine that indexed it
    pub path: String,
    /// Dialog lines in playback order
    pub dialogs: Vec<DialogLine>,
}

impl SubtitleRecord {
    /// Label shown while this record is being processed
    pub fn display_label(&self) -> &str {
        self.series_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.filename)
    }
}

/// Half-open window `[begin, end)` over the ordered record sequence.
///
/// `end == 0` means "until the last record".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordRange {
    pub begin: u64,
    pub end: u64,
}

impl RecordRange {
    pub fn new(begin: u64, end: u64) -> Self {
        Self { begin, end }
    }

    /// Every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether the window is open ended
    pub fn is_unbounded(&self) -> bool {
        self.end == 0
    }

    /// Maximum number of records in the window, `None` when open ended
    pub fn limit(&self) -> Option<u64> {
        if self.is_unbounded() {
            None
        } else {
            Some(self.end.saturating_sub(self.begin))
        }
    }

    /// Number of records the window selects out of `available`
    pub fn clamp_count(&self, available: u64) -> u64 {
        let upper = if self.is_unbounded() {
            available
        } else {
            self.end.min(available)
        };
        upper.saturating_sub(self.begin)
    }
}

impl fmt::Display for RecordRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "{}..", self.begin)
        } else {
            write!(f, "{}..{}", self.begin, self.end)
        }
    }
}

/// Read-only provider of locally indexed subtitle records.
///
/// Records are yielded in a stable order. The stream is finite and
/// single-pass; restarting means calling [`RecordSource::iterate`] again with
/// the same range.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Number of records [`RecordSource::iterate`] yields for `range`
    async fn count(&self, range: RecordRange) -> Result<u64>;

    /// Lazily stream the records selected by `range`
    fn iterate(&self, range: RecordRange) -> BoxStream<'_, Result<SubtitleRecord>>;
}
