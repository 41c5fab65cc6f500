//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides the adapters the `subsync` binary runs with:
//! - `HttpClient` using `reqwest`
//! - `RecordSource` reading the local subtitle database through `sqlx`
//! - `ProgressSink` drawing an `indicatif` bar on the terminal
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteRecordSource, TerminalProgress};
//!
//! #[core_async::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let records = SqliteRecordSource::connect("/data/subtitles.db").await?;
//!     let progress = TerminalProgress::new();
//!
//!     // Hand them to the uploader
//!     Ok(())
//! }
//! ```

mod http;
mod progress;
mod records;

pub use http::ReqwestHttpClient;
pub use progress::TerminalProgress;
pub use records::{SqliteRecordSource, SCHEMA};

pub use bridge_traits::NoopProgress;
