//! # Upload Coordinator
//!
//! Drives one batch of subtitle uploads.
//!
//! ## Overview
//!
//! `SubtitleUploader` walks the [`RecordSource`] in order and runs one upload
//! unit per record as its own task. A [`CapacityLimiter`] bounds how many
//! units are in flight; the driver waits for a free slot before it launches
//! the next record, so admission follows source order while completion order
//! is whatever the network makes it.
//!
//! ## Workflow
//!
//! 1. Count the records in the range and size the progress display
//! 2. For each record: label the progress, acquire a slot, spawn the unit
//! 3. Reap finished units as they complete and log their faults
//! 4. Once the source is exhausted, wait for every slot to be released
//! 5. Join the remaining tasks, close the HTTP client, finish the progress
//!
//! A unit that fails never fails the batch. The only error `run` returns is
//! a failure of the record source itself, and even then the units already
//! launched are drained first.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{SubtitleApi, SubtitleUploader, UploadOptions};
//! use bridge_traits::RecordRange;
//! use std::sync::Arc;
//!
//! let uploader = SubtitleUploader::new(
//!     api,
//!     Arc::new(records),
//!     Arc::new(progress),
//!     UploadOptions::default().with_parallel(4),
//! );
//! uploader.run(RecordRange::new(0, 100)).await?;
//! ```

use bridge_traits::{ProgressSink, RecordRange, RecordSource};
use core_async::task::{JoinError, JoinSet};
use core_async::CapacityLimiter;
use core_runtime::config::DEFAULT_PARALLEL;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::remote::{SubtitleApi, DEFAULT_UPLOAD_SLICE};
use crate::unit::{upload_subtitles, UnitOutcome};
use crate::{Result, SyncError};

/// Knobs of one upload batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Maximum number of records uploaded at the same time
    pub parallel: usize,

    /// Dialogs per bulk request
    pub upload_slice: usize,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            parallel: DEFAULT_PARALLEL,
            upload_slice: DEFAULT_UPLOAD_SLICE,
        }
    }
}

impl UploadOptions {
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_upload_slice(mut self, slice: usize) -> Self {
        self.upload_slice = slice;
        self
    }
}

type UnitResult = (String, Result<UnitOutcome>);

/// Tally of finished units, for the closing log line
#[derive(Debug, Default)]
struct BatchTally {
    skipped: u64,
    uploaded: u64,
    rejected: u64,
    faults: u64,
}

impl BatchTally {
    fn record(&mut self, joined: std::result::Result<UnitResult, JoinError>) {
        match joined {
            Ok((_, Ok(UnitOutcome::Skipped))) => self.skipped += 1,
            Ok((_, Ok(UnitOutcome::Done { .. }))) => self.uploaded += 1,
            Ok((_, Ok(UnitOutcome::Failed { .. }))) => self.rejected += 1,
            Ok((sha1, Err(err))) => {
                self.faults += 1;
                error!(sha1 = %sha1, error = %err, "Upload unit ended with a fault");
            }
            Err(join_err) if join_err.is_panic() => {
                self.faults += 1;
                error!(error = %join_err, "Upload unit panicked");
            }
            Err(join_err) => {
                self.faults += 1;
                warn!(error = %join_err, "Upload unit was cancelled");
            }
        }
    }
}

/// Bounded-concurrency uploader for a whole record range
pub struct SubtitleUploader {
    api: Arc<SubtitleApi>,
    source: Arc<dyn RecordSource>,
    progress: Arc<dyn ProgressSink>,
    options: UploadOptions,
    limiter: CapacityLimiter,
}

impl SubtitleUploader {
    pub fn new(
        api: SubtitleApi,
        source: Arc<dyn RecordSource>,
        progress: Arc<dyn ProgressSink>,
        options: UploadOptions,
    ) -> Self {
        let limiter = CapacityLimiter::new(options.parallel);
        Self {
            api: Arc::new(api),
            source,
            progress,
            options,
            limiter,
        }
    }

    pub fn options(&self) -> UploadOptions {
        self.options
    }

    /// Admission gate shared by the units of this uploader
    pub fn limiter(&self) -> &CapacityLimiter {
        &self.limiter
    }

    /// Upload every record of `range`
    ///
    /// Returns once every launched unit has finished. Unit failures are only
    /// logged; `Err` means the record source broke.
    pub async fn run(&self, range: RecordRange) -> Result<()> {
        let batch_id = Uuid::new_v4();
        let span = info_span!(
            "upload_batch",
            %batch_id,
            %range,
            parallel = self.limiter.capacity()
        );

        self.run_batch(range).instrument(span).await
    }

    async fn run_batch(&self, range: RecordRange) -> Result<()> {
        let total = self.source.count(range).await.map_err(SyncError::Source)?;
        self.progress.set_total(total);
        info!(total, "Starting upload batch");

        let mut tasks: JoinSet<UnitResult> = JoinSet::new();
        let mut tally = BatchTally::default();
        let mut source_error = None;

        {
            let mut records = self.source.iterate(range);
            while let Some(item) = records.next().await {
                let record = match item {
                    Ok(record) => record,
                    Err(err) => {
                        error!(error = %err, "Record source failed, draining in-flight uploads");
                        source_error = Some(SyncError::Source(err));
                        break;
                    }
                };

                self.progress.set_label(record.display_label());
                let token = self.limiter.acquire().await;

                let api = Arc::clone(&self.api);
                let progress = Arc::clone(&self.progress);
                let slice = self.options.upload_slice;
                tasks.spawn(
                    async move {
                        let result = upload_subtitles(&api, &record, slice).await;
                        token.release();
                        progress.advance(1);
                        (record.sha1, result)
                    }
                    .in_current_span(),
                );

                while let Some(joined) = tasks.try_join_next() {
                    tally.record(joined);
                }
            }
        }

        self.limiter.wait_all_finished().await;
        while let Some(joined) = tasks.join_next().await {
            tally.record(joined);
        }

        self.api.close().await;
        self.progress.finish();

        info!(
            skipped = tally.skipped,
            uploaded = tally.uploaded,
            rejected = tally.rejected,
            faults = tally.faults,
            "Upload batch finished"
        );

        match source_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_options_defaults() {
        let options = UploadOptions::default();
        assert_eq!(options.parallel, 2);
        assert_eq!(options.upload_slice, 400);

        let tuned = options.with_parallel(8).with_upload_slice(100);
        assert_eq!(tuned.parallel, 8);
        assert_eq!(tuned.upload_slice, 100);
    }

    #[test]
    fn test_tally_counts_outcomes() {
        let mut tally = BatchTally::default();
        tally.record(Ok(("a".to_string(), Ok(UnitOutcome::Skipped))));
        tally.record(Ok(("b".to_string(), Ok(UnitOutcome::Done { dialogs: 3 }))));
        tally.record(Ok((
            "c".to_string(),
            Ok(UnitOutcome::Failed {
                status: 500,
                body: String::new(),
            }),
        )));
        tally.record(Ok((
            "d".to_string(),
            Err(SyncError::Decode("garbage".to_string())),
        )));

        assert_eq!(tally.skipped, 1);
        assert_eq!(tally.uploaded, 1);
        assert_eq!(tally.rejected, 1);
        assert_eq!(tally.faults, 1);
    }
}
