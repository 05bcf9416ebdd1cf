//! Service configuration.

use std::time::Duration;

/// Tunables for the polling service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Delay between update cycles
    pub update_interval: Duration,
    /// Delay before retrying an empty discovery probe
    pub discovery_retry_delay: Duration,
    /// Maximum session age before a fresh login is forced
    pub relogin_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(60),
            discovery_retry_delay: Duration::from_secs(60),
            relogin_interval: Duration::from_secs(2 * 60 * 60), // don't login every time
        }
    }
}
