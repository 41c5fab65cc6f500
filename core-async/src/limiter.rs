//! Capacity limiter
//!
//! A counting admission gate that bounds how many units of work run at the
//! same time and keeps track of how many admitted units have not finished
//! yet, so a driver can wait for the whole batch to drain.
//!
//! Admission is backed by a FIFO [`Semaphore`]: a release hands the slot to
//! at most one waiting [`CapacityLimiter::acquire`]. The outstanding-work
//! counter lives in a [`watch`] channel so waiters of
//! [`CapacityLimiter::wait_all_finished`] are woken on every change.
//!
//! A [`CapacityToken`] is the proof of admission. It is released exactly once:
//! either explicitly through [`CapacityToken::release`] or implicitly when it
//! is dropped, which covers panicking and aborted tasks.
//!
//! ```rust
//! use core_async::limiter::CapacityLimiter;
//!
//! core_async::runtime::block_on(async {
//!     let limiter = CapacityLimiter::new(1);
//!     let first = limiter.acquire().await;
//!     assert_eq!(limiter.available(), 0);
//!     assert_eq!(limiter.outstanding(), 1);
//!
//!     first.release();
//!     limiter.wait_all_finished().await;
//!     assert_eq!(limiter.outstanding(), 0);
//! });
//! ```

use crate::sync::{watch, OwnedSemaphorePermit, Semaphore};
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

struct LimiterState {
    capacity: usize,
    permits: Arc<Semaphore>,
    outstanding: watch::Sender<usize>,
}

/// Admission gate bounding the number of concurrently running units.
///
/// Cloning is cheap and every clone shares the same slots and counter.
#[derive(Clone)]
pub struct CapacityLimiter {
    state: Arc<LimiterState>,
}

impl CapacityLimiter {
    /// Create a limiter admitting up to `capacity` units at once.
    ///
    /// A capacity of zero would deadlock the first `acquire`, so it is
    /// clamped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (outstanding, _) = watch::channel(0usize);

        Self {
            state: Arc::new(LimiterState {
                capacity,
                permits: Arc::new(Semaphore::new(capacity)),
                outstanding,
            }),
        }
    }

    /// Maximum number of units admitted at once.
    pub fn capacity(&self) -> usize {
        self.state.capacity
    }

    /// Number of free slots right now.
    pub fn available(&self) -> usize {
        self.state.permits.available_permits()
    }

    /// Number of admitted units that have not released their token yet.
    pub fn outstanding(&self) -> usize {
        *self.state.outstanding.borrow()
    }

    /// Wait until fewer than `capacity` units are admitted, then take a slot.
    ///
    /// On return the outstanding counter already includes the caller.
    pub async fn acquire(&self) -> CapacityToken {
        let permit = match Arc::clone(&self.state.permits).acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(err) => {
                // The semaphore is private and never closed; admit anyway
                // rather than failing the batch.
                warn!(error = %err, "Capacity semaphore closed, admitting without a slot");
                None
            }
        };

        self.state.outstanding.send_modify(|count| *count += 1);
        trace!(outstanding = self.outstanding(), "Capacity slot acquired");

        CapacityToken {
            state: Arc::clone(&self.state),
            permit,
            released: false,
        }
    }

    /// Wait until every admitted unit has released its token.
    ///
    /// Only meaningful once the caller has stopped calling `acquire`: the
    /// counter may touch zero between two launches.
    pub async fn wait_all_finished(&self) {
        let mut outstanding = self.state.outstanding.subscribe();
        // The sender lives in `self.state`, so the channel cannot close here.
        let _ = outstanding.wait_for(|count| *count == 0).await;
    }
}

impl fmt::Debug for CapacityLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapacityLimiter")
            .field("capacity", &self.capacity())
            .field("available", &self.available())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

/// One admitted slot held by an in-flight unit.
#[must_use = "dropping a token immediately releases its slot"]
pub struct CapacityToken {
    state: Arc<LimiterState>,
    permit: Option<OwnedSemaphorePermit>,
    released: bool,
}

impl CapacityToken {
    /// Give the slot back and wake at most one waiting `acquire`.
    pub fn release(mut self) {
        self.release_slot();
    }

    fn release_slot(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        self.state
            .outstanding
            .send_modify(|count| *count = count.saturating_sub(1));
        drop(self.permit.take());

        trace!(
            outstanding = *self.state.outstanding.borrow(),
            "Capacity slot released"
        );
    }
}

impl Drop for CapacityToken {
    fn drop(&mut self) {
        self.release_slot();
    }
}

impl fmt::Debug for CapacityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapacityToken")
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{sleep, timeout, Duration};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_zero_capacity_is_clamped() {
        let limiter = CapacityLimiter::new(0);
        assert_eq!(limiter.capacity(), 1);
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test]
    async fn test_acquire_counts_outstanding() {
        let limiter = CapacityLimiter::new(3);

        let a = limiter.acquire().await;
        let b = limiter.acquire().await;
        assert_eq!(limiter.outstanding(), 2);
        assert_eq!(limiter.available(), 1);

        a.release();
        assert_eq!(limiter.outstanding(), 1);
        assert_eq!(limiter.available(), 2);

        drop(b);
        assert_eq!(limiter.outstanding(), 0);
        assert_eq!(limiter.available(), 3);
    }

    #[tokio::test]
    async fn test_acquire_waits_for_free_slot() {
        let limiter = CapacityLimiter::new(1);
        let held = limiter.acquire().await;

        let blocked = timeout(Duration::from_millis(20), limiter.acquire()).await;
        assert!(blocked.is_err(), "second acquire must wait while the slot is held");

        held.release();
        let admitted = timeout(Duration::from_millis(100), limiter.acquire()).await;
        assert!(admitted.is_ok());
    }

    #[tokio::test]
    async fn test_wait_all_finished_returns_immediately_when_idle() {
        let limiter = CapacityLimiter::new(2);
        let result = timeout(Duration::from_millis(50), limiter.wait_all_finished()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wait_all_finished_drains_spawned_units() {
        let limiter = CapacityLimiter::new(2);
        let finished = Arc::new(AtomicUsize::new(0));

        for delay in [30u64, 10, 20, 5] {
            let token = limiter.acquire().await;
            let finished = Arc::clone(&finished);
            tokio::spawn(async move {
                sleep(Duration::from_millis(delay)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                token.release();
            });
        }

        limiter.wait_all_finished().await;
        assert_eq!(finished.load(Ordering::SeqCst), 4);
        assert_eq!(limiter.outstanding(), 0);
        assert_eq!(limiter.available(), 2);
    }

    #[tokio::test]
    async fn test_token_released_when_task_panics() {
        let limiter = CapacityLimiter::new(1);
        let token = limiter.acquire().await;

        let handle = tokio::spawn(async move {
            let _token = token;
            panic!("unit blew up");
        });
        assert!(handle.await.is_err());

        assert_eq!(limiter.outstanding(), 0);
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test]
    async fn test_bounded_concurrency() {
        let limiter = CapacityLimiter::new(2);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..6 {
            let token = limiter.acquire().await;
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            tokio::spawn(async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(10)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                token.release();
            });
        }

        limiter.wait_all_finished().await;
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }
}
