// Shared transport configuration for building reqwest::Client instances.

use std::time::Duration;

const USER_AGENT: &str = concat!("zlog-dashboard/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. A poll that exceeds it surfaces as a network error.
    pub timeout: Duration,
    /// Connect timeout, kept shorter so an offline backend fails fast.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl TransportConfig {
    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout.min(self.timeout))
            .user_agent(USER_AGENT)
            .build()
            .map_err(crate::error::Error::Transport)
    }
}
