// Runtime settings consumed by the sync engine.
//
// Built by `zlog-config` from file/env/CLI layers; the core never reads
// the environment itself.

use std::time::Duration;

use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);
pub const DEFAULT_LOG_LIMIT: u32 = 200;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the dashboard engine needs to talk to one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Backend root, e.g. `http://localhost:8000`.
    pub base_url: Url,
    /// Period of the log and stats subscriptions.
    pub poll_interval: Duration,
    /// Quiet period before a typed filter is committed.
    pub debounce: Duration,
    /// Page size requested from `/api/logs`.
    pub log_limit: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BACKEND_URL).expect("static backend URL is valid"),
            poll_interval: DEFAULT_POLL_INTERVAL,
            debounce: DEFAULT_DEBOUNCE,
            log_limit: DEFAULT_LOG_LIMIT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
