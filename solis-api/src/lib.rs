//! Portal API layer for Ginlong/Solis inverter monitoring.
//!
//! This crate defines the capability contract a polling engine consumes
//! ([`PortalApi`]), the shared data model for inverter readings, and thin
//! clients for the two supported portals:
//!
//! - the classic Ginlong platform (m.ginlong.com)
//! - the SolisCloud HTTP API
//!
//! A [`PortalConfig`] variant selects the client; [`portal_api_for`] resolves
//! it and rejects unusable configuration with a typed error.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use solis_api::{portal_api_for, GinlongConfig, PortalConfig, TransportSession};
//!
//! let config = PortalConfig::Ginlong(GinlongConfig::new("user@example.com", "secret"));
//! let mut api = portal_api_for(config)?;
//!
//! let transport = TransportSession::new();
//! if api.login(&transport).await {
//!     for serial in api.inverters().unwrap_or_default() {
//!         if let Some(data) = api.fetch_inverter_data(&serial).await {
//!             println!("{}: {} attributes", serial, data.len());
//!         }
//!     }
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod types;

mod ginlong;
mod soliscloud;

pub use api::{portal_api_for, PortalApi, TransportSession};
pub use config::{GinlongConfig, PortalConfig, SoliscloudConfig};
pub use error::{ApiError, Result};
pub use ginlong::GinlongApi;
pub use soliscloud::SoliscloudApi;
pub use types::{
    AttributeValue, InverterData, InverterSerial, InverterState, ENERGY_TODAY, INVERTER_STATE,
};
