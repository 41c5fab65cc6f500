//! Progress Reporting
//!
//! Purely cosmetic sink for batch progress. Nothing in the core reads back
//! from it.

/// Receives a running count against a total plus a label for the current item.
pub trait ProgressSink: Send + Sync {
    /// Total number of items the batch will go through
    fn set_total(&self, total: u64);

    /// Label describing the item currently being admitted
    fn set_label(&self, label: &str);

    /// Mark `delta` more items as finished
    fn advance(&self, delta: u64);

    /// The batch is over
    fn finish(&self);
}

/// Sink that discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn set_total(&self, _total: u64) {}

    fn set_label(&self, _label: &str) {}

    fn advance(&self, _delta: u64) {}

    fn finish(&self) {}
}
