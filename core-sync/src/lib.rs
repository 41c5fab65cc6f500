//! # Subtitle Sync Module
//!
//! Uploads locally indexed subtitle files and their dialogs to the remote
//! subtitle service.
//!
//! ## Overview
//!
//! Each record goes through the same three steps: ask the service whether
//! the file is already there, create the file, then create its dialogs in
//! slices. Records run concurrently up to a configured parallelism, and a
//! record the service refuses does not stop the others.
//!
//! ## Components
//!
//! - **Wire Models** (`models`): Request and response bodies of the service
//! - **Remote API** (`remote`): The three protocol round-trips
//! - **Upload Unit** (`unit`): Per-record workflow with failure containment
//! - **Upload Coordinator** (`coordinator`): Bounded-concurrency batch driver

pub mod coordinator;
pub mod error;
pub mod models;
pub mod remote;
pub mod unit;

pub use coordinator::{SubtitleUploader, UploadOptions};
pub use error::{Result, SyncError};
pub use models::{BulkDialogCreate, DialogCreate, FileCreate, RemoteDialog, RemoteFile};
pub use remote::{FileLookup, SubtitleApi, BULK_UPLOAD_TIMEOUT, DEFAULT_UPLOAD_SLICE};
pub use unit::{upload_subtitles, UnitOutcome};
