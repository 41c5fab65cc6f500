//! Async file access, used to load credential files.

pub use tokio::fs::{read, remove_file, write};
