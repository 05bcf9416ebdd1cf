//! Portal account configuration.

use crate::error::{ApiError, Result};

/// Default domain for the classic Ginlong monitoring platform.
pub const GINLONG_DOMAIN: &str = "https://m.ginlong.com";

/// Default domain for the SolisCloud API.
pub const SOLISCLOUD_DOMAIN: &str = "https://www.soliscloud.com:13333";

/// Account configuration for one of the supported portals.
///
/// Each variant selects the matching API client; see
/// [`portal_api_for`](crate::api::portal_api_for).
#[derive(Debug, Clone)]
pub enum PortalConfig {
    /// Classic m.ginlong.com style platform
    Ginlong(GinlongConfig),
    /// SolisCloud HTTP API
    Soliscloud(SoliscloudConfig),
}

/// Credentials and endpoint for the classic Ginlong platform.
#[derive(Debug, Clone)]
pub struct GinlongConfig {
    /// Portal account user name
    pub username: String,
    /// Portal account password
    pub password: String,
    /// Portal base URL
    pub domain: String,
    /// Restrict polling to one plant; `None` polls the whole account
    pub plant_id: Option<String>,
}

impl GinlongConfig {
    /// Create a configuration for the default portal domain.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            domain: GINLONG_DOMAIN.to_string(),
            plant_id: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ApiError::InvalidConfig(
                "ginlong portal requires a username and password".to_string(),
            ));
        }
        if self.domain.is_empty() {
            return Err(ApiError::InvalidConfig(
                "ginlong portal domain must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Credentials and endpoint for the SolisCloud API.
#[derive(Debug, Clone)]
pub struct SoliscloudConfig {
    /// API key identifier issued by the portal
    pub key_id: String,
    /// API key secret issued by the portal
    pub secret: String,
    /// Portal base URL
    pub domain: String,
    /// Restrict polling to one station; `None` polls the whole account
    pub station_id: Option<String>,
}

impl SoliscloudConfig {
    /// Create a configuration for the default portal domain.
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.into(),
            domain: SOLISCLOUD_DOMAIN.to_string(),
            station_id: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.key_id.is_empty() || self.secret.is_empty() {
            return Err(ApiError::InvalidConfig(
                "soliscloud portal requires a key id and secret".to_string(),
            ));
        }
        if self.domain.is_empty() {
            return Err(ApiError::InvalidConfig(
                "soliscloud portal domain must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
