//! The portal capability contract and the config-to-client factory.

use async_trait::async_trait;

use crate::config::PortalConfig;
use crate::error::Result;
use crate::ginlong::GinlongApi;
use crate::soliscloud::SoliscloudApi;
use crate::types::{InverterData, InverterSerial};

/// HTTP transport handed to the capability at login time.
///
/// The client is cheap to clone and pools connections internally; portal
/// clients keep a clone for the lifetime of the session.
pub type TransportSession = reqwest::Client;

/// Capability contract for a remote inverter-monitoring portal.
///
/// Failures stay inside the contract: `login` reports success as a flag and
/// `fetch_inverter_data` reports a failed fetch as `None`. Callers decide how
/// to react; the capability never panics and never raises.
#[async_trait]
pub trait PortalApi: Send {
    /// Live connectivity flag. Never cached by callers.
    fn is_online(&self) -> bool;

    /// Authenticate against the portal using the supplied transport.
    async fn login(&mut self, transport: &TransportSession) -> bool;

    /// Drop the portal session. Local state is reset even when the remote
    /// side never learns about the logout.
    async fn logout(&mut self);

    /// Serials of all inverters on the account, `None` when unavailable.
    fn inverters(&self) -> Option<Vec<InverterSerial>>;

    /// Fetch a fresh snapshot for one inverter, `None` on any failure.
    async fn fetch_inverter_data(&mut self, serial: &InverterSerial) -> Option<InverterData>;
}

/// Resolve a portal configuration to the matching API client.
///
/// # Errors
///
/// Returns [`ApiError::InvalidConfig`](crate::error::ApiError::InvalidConfig)
/// when the variant's credentials or endpoint are unusable. Construction is
/// the only place configuration is rejected; a successfully built client is
/// ready for `login`.
pub fn portal_api_for(config: PortalConfig) -> Result<Box<dyn PortalApi>> {
    match config {
        PortalConfig::Ginlong(config) => {
            config.validate()?;
            Ok(Box::new(GinlongApi::new(config)))
        }
        PortalConfig::Soliscloud(config) => {
            config.validate()?;
            Ok(Box::new(SoliscloudApi::new(config)))
        }
    }
}
