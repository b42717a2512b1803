use std::time::Duration;

/// Tuning for one polling run.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between status fetches.
    pub poll_interval: Duration,
    /// Maximum number of status fetches before giving up. Exhausting the
    /// budget is not a failure; the task may still finish in the background.
    pub max_ticks: u32,
    /// How many times to re-query the product store after a `finished` status
    /// before concluding the store is genuinely empty.
    pub store_retry_attempts: u32,
    /// Delay between store retries.
    pub store_retry_interval: Duration,
    /// Lifetime of auto-dismissing advisory banners.
    pub advisory_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_ticks: 360,
            store_retry_attempts: 5,
            store_retry_interval: Duration::from_secs(3),
            advisory_timeout: Duration::from_secs(8),
        }
    }
}

impl PollConfig {
    /// Budget for the secondary per-product deep-search flow.
    pub fn deep_search() -> Self {
        Self {
            max_ticks: 60,
            ..Default::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u32) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn with_store_retries(mut self, attempts: u32, interval: Duration) -> Self {
        self.store_retry_attempts = attempts;
        self.store_retry_interval = interval;
        self
    }

    pub fn with_advisory_timeout(mut self, timeout: Duration) -> Self {
        self.advisory_timeout = timeout;
        self
    }
}
