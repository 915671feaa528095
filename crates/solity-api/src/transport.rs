// Transport configuration for building the shared reqwest::Client.
//
// The vendor API expects the mobile app's user agent and gzip support;
// every request is bounded by the same timeout.

use std::time::Duration;

use crate::error::Error;

/// Request timeout applied to every vendor call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: crate::USER_AGENT.into(),
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    ///
    /// The `gzip` feature makes reqwest send `Accept-Encoding: gzip` and
    /// decode compressed bodies transparently.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .gzip(true)
            .build()
            .map_err(|e| Error::Api {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })
    }
}
