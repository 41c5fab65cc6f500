//! Synchronization primitives.
//!
//! Async-aware re-exports of `tokio::sync`. The limiter is built from the
//! semaphore and the watch channel.

pub use tokio::sync::{watch, Mutex, MutexGuard, OwnedSemaphorePermit, Semaphore};
