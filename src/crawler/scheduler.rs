//! Per-site request pacing
//!
//! Every site gets a politeness gate: a fixed-interval gate that lets one
//! request through at a time and keeps at least the configured delay between
//! consecutive requests, however many article fetches are in flight.

use crate::state::SiteState;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Fixed-interval gate for outbound requests to one site
#[derive(Debug)]
pub struct PolitenessGate {
    interval: Duration,
    state: Mutex<SiteState>,
}

impl PolitenessGate {
    /// Creates a gate enforcing `interval` between requests
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Mutex::new(SiteState::new()),
        }
    }

    /// Waits until the site may receive another request, then records it
    ///
    /// Waiters are served in FIFO order; the lock is held while sleeping so
    /// the next waiter measures its interval from this request.
    pub async fn wait_turn(&self) {
        let mut state = self.state.lock().await;

        if let Some(wait) = state.time_until_next_request(self.interval, Instant::now()) {
            tracing::trace!("Politeness delay: waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }

        state.record_request(Instant::now());
    }

    /// Number of requests let through so far
    pub async fn request_count(&self) -> u32 {
        self.state.lock().await.request_count
    }
}
