//! Task spawning and execution abstractions.
//!
//! Spawned tasks run concurrently with the caller on the current runtime.
//! A [`JoinSet`] collects handles so a caller can reap them as they finish
//! and join whatever is left at the end.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task::JoinSet;
//!
//! core_async::runtime::block_on(async {
//!     let mut set = JoinSet::new();
//!     for i in 0..3 {
//!         set.spawn(async move { i * 2 });
//!     }
//!
//!     let mut total = 0;
//!     while let Some(result) = set.join_next().await {
//!         total += result.unwrap();
//!     }
//!     assert_eq!(total, 6);
//! });
//! ```

pub use tokio::task::{JoinError, JoinHandle, JoinSet};

/// Spawns a new asynchronous task on the current runtime.
///
/// # Examples
///
/// ```rust
/// use core_async::task::spawn;
///
/// # async fn example() {
/// let handle = spawn(async { 42 });
/// assert_eq!(handle.await.unwrap(), 42);
/// # }
/// ```
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

