//! Runtime facade for the subtitle uploader.
//!
//! Every other crate in the workspace depends on this crate instead of
//! reaching for Tokio directly. It re-exports the executor primitives the
//! uploader needs and adds the [`limiter::CapacityLimiter`] admission gate
//! that bounds how many upload units run at once.
//!
//! # Modules
//!
//! - `fs`: Async file reads and writes
//! - `task`: Task spawning and join sets
//! - `time`: Sleep, timeout and instants
//! - `sync`: Async-aware locks and channels
//! - `runtime`: `block_on` over a current-thread runtime
//! - `limiter`: Counting admission gate with drain support
//!
//! # Examples
//!
//! ```rust
//! use core_async::limiter::CapacityLimiter;
//!
//! core_async::runtime::block_on(async {
//!     let limiter = CapacityLimiter::new(2);
//!     let token = limiter.acquire().await;
//!     let handle = core_async::task::spawn(async move {
//!         // do the work, then give the slot back
//!         token.release();
//!     });
//!     handle.await.unwrap();
//!     limiter.wait_all_finished().await;
//! });
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod fs;
pub mod limiter;
pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use limiter::{CapacityLimiter, CapacityToken};
pub use task::spawn;
pub use time::{sleep, Duration, Instant};
