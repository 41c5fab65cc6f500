//! # Host Bridge Traits
//!
//! Seams between the upload core and the host it runs on.
//!
//! ## Overview
//!
//! The core only knows how to drive a batch of uploads. Everything it needs
//! from the outside world is expressed as a trait here, and each host ships
//! concrete adapters (see `bridge-desktop`):
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP transport shared by every upload
//! - [`RecordSource`](records::RecordSource) - Ordered, countable stream of local subtitle records
//! - [`ProgressSink`](progress::ProgressSink) - Cosmetic progress display
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Adapters convert
//! library-specific failures into it and keep enough context (URL, database
//! path) in the message to act on.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`: one instance is shared by every
//! concurrently running upload task.

pub mod error;
pub mod http;
pub mod progress;
pub mod records;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use progress::{NoopProgress, ProgressSink};
pub use records::{DialogLine, RecordRange, RecordSource, SubtitleRecord};
