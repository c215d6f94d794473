use std::time::{Duration, Instant};

/// Tracks the outbound request timing of one site
///
/// Used by the politeness gate to keep a minimum interval between
/// consecutive requests to the same site.
#[derive(Debug, Clone, Default)]
pub struct SiteState {
    /// Number of requests made to this site in the current crawl
    pub request_count: u32,

    /// Timestamp of the last request to this site
    pub last_request_time: Option<Instant>,
}

impl SiteState {
    /// Creates a new SiteState with no requests recorded
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a request can be made to this site at `now`
    ///
    /// # Arguments
    ///
    /// * `min_interval` - Minimum time between requests to the site
    /// * `now` - The current time instant
    pub fn can_request(&self, min_interval: Duration, now: Instant) -> bool {
        self.time_until_next_request(min_interval, now).is_none()
    }

    /// Records that a request was made to this site
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, min_interval: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < min_interval).then(|| min_interval - elapsed)
    }
}
