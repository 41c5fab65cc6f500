//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the uploader crates:
//! - Logging and tracing initialisation
//! - Configuration with fail-fast validation
//!
//! ## Overview
//!
//! This crate establishes the logging conventions and the validated
//! [`SyncConfig`](config::SyncConfig) that the binary builds once at startup
//! and hands to the rest of the system.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
