//! Runtime utilities that abstract over the underlying async executor.
//!
//! The uploader is a single-threaded cooperative program: one thread of
//! control multiplexes every in-flight network call. `block_on` therefore
//! always builds a current-thread runtime.

use tokio::runtime::Builder;

/// Runs the provided future to completion on a current-thread runtime.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}
