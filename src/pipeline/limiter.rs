//! In-flight concurrency limiter for embedding calls.
//!
//! At most `max_in_flight` embedding requests may be outstanding across
//! every session sharing this limiter. Callers await a slot and hold an
//! RAII permit while the request is in flight; the slot is released when
//! the permit drops, on success or failure alike. Constructed explicitly
//! and injected (typically behind an `Arc`) rather than living in process
//! globals.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::trace;

use super::error::PipelineError;

/// Bounds concurrent embedding requests process-wide
#[derive(Debug)]
pub struct RateLimiter {
    semaphore: Semaphore,
    in_flight: AtomicUsize,
    max_in_flight: usize,
}

/// RAII permit for one in-flight request
pub struct InFlightPermit<'a> {
    _permit: SemaphorePermit<'a>,
    counter: &'a AtomicUsize,
}

impl Drop for InFlightPermit<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RateLimiter {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            semaphore: Semaphore::new(max_in_flight),
            in_flight: AtomicUsize::new(0),
            max_in_flight,
        }
    }

    /// Wait for a slot. The returned permit tracks the request as in
    /// flight until dropped.
    pub async fn acquire(&self) -> Result<InFlightPermit<'_>, PipelineError> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| PipelineError::Limiter(e.to_string()))?;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(in_flight = now, max = self.max_in_flight, "acquired slot");
        Ok(InFlightPermit {
            _permit: permit,
            counter: &self.in_flight,
        })
    }

    /// Requests currently in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Configured concurrency bound
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}
