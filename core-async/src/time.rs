//! Time-related operations.
//!
//! Tokio timers and the standard clock types.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, timeout, Duration};
//!
//! # async fn example() {
//! sleep(Duration::from_millis(10)).await;
//!
//! let result = timeout(Duration::from_secs(1), async { 42 }).await;
//! assert_eq!(result.unwrap(), 42);
//! # }
//! ```

pub use std::time::{Duration, Instant};
pub use tokio::time::{error::Elapsed, sleep, timeout};
