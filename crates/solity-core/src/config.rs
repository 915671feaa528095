// ── Runtime integration configuration ──
//
// Describes *how* to reach the vendor API and how often to poll.
// Carries credentials but never touches disk; `solity-config` or the host
// builds one and hands it in.

use std::time::Duration;

use solity_api::Credentials;
use url::Url;

/// Default polling cadence.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Everything needed to set up one integration instance.
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    /// Account credentials.
    pub credentials: Credentials,
    /// API root (defaults to the production endpoint).
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Time between coordinator refreshes.
    pub update_interval: Duration,
}

impl IntegrationConfig {
    /// Production endpoint with default timeout and polling cadence.
    pub fn new(credentials: Credentials) -> Result<Self, solity_api::Error> {
        Ok(Self {
            credentials,
            base_url: Url::parse(solity_api::API_BASE_URL)?,
            timeout: solity_api::transport::DEFAULT_TIMEOUT,
            update_interval: DEFAULT_UPDATE_INTERVAL,
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_update_interval(mut self, update_interval: Duration) -> Self {
        self.update_interval = update_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_vendor_expectations() {
        let cfg = IntegrationConfig::new(Credentials::new("a@b.c", "pw")).expect("config");
        assert_eq!(cfg.base_url.as_str(), "https://www.smartsolity.com/api_v2");
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.update_interval, Duration::from_secs(300));
    }
}
