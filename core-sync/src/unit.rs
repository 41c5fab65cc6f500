//! Per-record upload workflow.
//!
//! ```text
//! lookup --found--> Skipped
//!    |
//!  absent --> create file --> create dialogs --> Done
//!                  |                |
//!                  +---rejected-----+--> Failed
//! ```
//!
//! A rejection by the service ends the unit in [`UnitOutcome::Failed`] and
//! stays inside the unit. Anything else is an internal fault: it is logged
//! and returned as `Err`.

use bridge_traits::records::SubtitleRecord;
use tracing::{debug, error, Instrument};

use crate::remote::{FileLookup, SubtitleApi};
use crate::{Result, SyncError};

/// How one record's upload ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Already present upstream
    Skipped,
    /// File and all of its dialogs were created
    Done { dialogs: usize },
    /// The service refused one of the create calls
    Failed { status: u16, body: String },
}

/// Upload one record: dedup check, then file, then its dialogs
pub async fn upload_subtitles(
    api: &SubtitleApi,
    record: &SubtitleRecord,
    slice: usize,
) -> Result<UnitOutcome> {
    let span = tracing::debug_span!(
        "upload_subtitles",
        sha1 = %record.sha1,
        filename = %record.filename
    );

    async move {
        match run_unit(api, record, slice).await {
            Ok(outcome) => Ok(outcome),
            Err(SyncError::Rejected { status, body }) => {
                error!(status, body = %body, "Server rejected upload");
                Ok(UnitOutcome::Failed { status, body })
            }
            Err(err) => {
                error!(error = %err, unexpected = true, "Unexpected fault while uploading subtitles");
                Err(err)
            }
        }
    }
    .instrument(span)
    .await
}

async fn run_unit(
    api: &SubtitleApi,
    record: &SubtitleRecord,
    slice: usize,
) -> Result<UnitOutcome> {
    match api.get_file(&record.sha1).await {
        Ok(FileLookup::Found(existing)) => {
            debug!(file_id = %existing.id, "File existed upstream, skip");
            return Ok(UnitOutcome::Skipped);
        }
        Ok(FileLookup::Absent) => {}
        Err(SyncError::Rejected { status, body }) => {
            return Err(SyncError::LookupFailed { status, body })
        }
        Err(err) => return Err(err),
    }

    let file = api.upload_file(record).await?;
    let dialogs = api.upload_dialogs(&file.id, &record.dialogs, slice).await?;

    Ok(UnitOutcome::Done {
        dialogs: dialogs.len(),
    })
}
