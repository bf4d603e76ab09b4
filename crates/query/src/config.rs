use std::time::Duration;

/// How long a cached value counts as fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleTime {
    After(Duration),
    Never,
}

impl StaleTime {
    pub const fn minutes(m: u64) -> Self {
        StaleTime::After(Duration::from_secs(m * 60))
    }
}

/// Per-resource staleness windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleTimes {
    pub agents_list: StaleTime,
    pub agents_detail: StaleTime,
    pub agents_stats: StaleTime,
    pub agents_available: StaleTime,
    pub agents_search: StaleTime,
    pub missions: StaleTime,
    pub targets: StaleTime,
    pub breeds: StaleTime,
}

impl Default for StaleTimes {
    fn default() -> Self {
        Self {
            agents_list: StaleTime::minutes(5),
            agents_detail: StaleTime::minutes(5),
            agents_stats: StaleTime::minutes(5),
            agents_available: StaleTime::minutes(2),
            agents_search: StaleTime::minutes(2),
            missions: StaleTime::minutes(3),
            targets: StaleTime::minutes(3),
            breeds: StaleTime::Never,
        }
    }
}

/// Retry settings shared by every query of a [`QueryClient`](crate::QueryClient).
#[derive(Debug, Clone, PartialEq)]
pub struct QueryClientConfig {
    /// Extra attempts after a failed fetch.
    pub retry: u32,
    /// Delay before the first retry.
    pub retry_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_retry_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub retry_multiplier: f64,
}

impl Default for QueryClientConfig {
    fn default() -> Self {
        Self {
            retry: 1,
            retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
            retry_multiplier: 2.0,
        }
    }
}

/// Everything [`Agency`](crate::Agency) needs besides the API.
#[derive(Debug, Clone, Default)]
pub struct AgencyConfig {
    pub query: QueryClientConfig,
    pub stale_times: StaleTimes,
}

/// Options for a single query read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub stale_time: StaleTime,
    /// Overrides [`QueryClientConfig::retry`] when set.
    pub retry: Option<u32>,
}

impl QueryOptions {
    pub fn new(stale_time: StaleTime) -> Self {
        Self {
            stale_time,
            retry: None,
        }
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = Some(retry);
        self
    }
}
