//! Polling, session and subscription engine for Ginlong/Solis inverter
//! portals.
//!
//! The service polls a remote monitoring portal on a fixed cadence,
//! normalizes the readings, and notifies per-inverter, per-attribute
//! subscribers when values change.
//!
//! # Architecture
//!
//! ```text
//!  host timer ──► InverterService::run_cycle ──► SessionManager ──► PortalApi
//!      ▲                    │                    (login/renewal)   (fetch)
//!      │                    ▼
//!      └──────── TaskScheduler::schedule        SubscriptionRegistry
//!               (re-arm next cycle)                    │
//!                                                      ▼
//!                                          Subscriber::notify ──► ApplyUpdate
//!                                          (timestamp de-dup)    (host target)
//! ```
//!
//! Cycles re-arm themselves through the host's [`TaskScheduler`] instead of
//! running on an interval timer, so two cycles never overlap and every state
//! is only ever touched from inside a cycle. Failures are absorbed: a failed
//! login or fetch marks the cycle [`CycleStatus::NotOk`] and the next cycle
//! is scheduled anyway.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use solis_api::{GinlongConfig, PortalConfig, TransportSession};
//! use solis_service::InverterService;
//!
//! let portal = PortalConfig::Ginlong(GinlongConfig::new("user@example.com", "secret"));
//! let mut service = InverterService::new(portal, TransportSession::new(), scheduler)?;
//!
//! service.subscribe(Box::new(power_sensor), "110A1234".into(), "power_ac");
//! service.run_cycle().await;
//! ```

pub mod config;
pub mod correction;
pub mod error;
pub mod logging;
pub mod registry;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod subscriber;

pub use config::ServiceConfig;
pub use correction::{correct_energy_today, Correction};
pub use error::{Result, ServiceError};
pub use registry::SubscriptionRegistry;
pub use scheduler::{ScheduledTask, TaskScheduler};
pub use service::{
    CycleStatus, DiscoveryCallback, DiscoveryCookie, DiscoveryResult, InverterService,
    PortalStatus,
};
pub use session::SessionManager;
pub use subscriber::{ApplyUpdate, Subscriber};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
