//! The inverter polling service: update and discovery engines.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde_json::Value;
use tracing::{debug, warn};

use solis_api::{portal_api_for, InverterSerial, PortalApi, PortalConfig, TransportSession};

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::registry::SubscriptionRegistry;
use crate::scheduler::{ScheduledTask, TaskScheduler};
use crate::session::SessionManager;
use crate::subscriber::{ApplyUpdate, Subscriber};

/// Result of one update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// At least one inverter delivered fresh data and no later fetch failed.
    Ok,
    /// Login failed, the device list was unavailable, or a fetch failed.
    NotOk,
}

/// Portal connectivity as exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalStatus {
    Online,
    Offline,
}

impl fmt::Display for PortalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalStatus::Online => write!(f, "Online"),
            PortalStatus::Offline => write!(f, "Offline"),
        }
    }
}

/// Attribute names observed per inverter by one discovery probe.
pub type DiscoveryResult = HashMap<InverterSerial, Vec<String>>;

/// Opaque host payload handed back together with discovery results.
pub type DiscoveryCookie = Value;

/// Invoked with the probe result and the cookie supplied at registration.
pub type DiscoveryCallback = Box<dyn Fn(&DiscoveryResult, &DiscoveryCookie) + Send>;

struct DiscoveryRegistration {
    callback: DiscoveryCallback,
    cookie: DiscoveryCookie,
}

/// Serves every inverter on one portal account.
///
/// The service is driven from outside: the host's timer invokes
/// [`run_cycle`](Self::run_cycle) and [`discover`](Self::discover), and each
/// cycle re-arms its own successor through the [`TaskScheduler`] capability.
/// All state is touched from within a cycle, so the engine is single-threaded
/// by construction and needs no locking.
pub struct InverterService {
    session: SessionManager,
    registry: SubscriptionRegistry,
    scheduler: Box<dyn TaskScheduler>,
    config: ServiceConfig,
    last_updated: Option<DateTime<Local>>,
    discovery: Option<DiscoveryRegistration>,
}

impl InverterService {
    /// Build a service for one portal account with default tunables.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`](crate::ServiceError::Config) when the
    /// portal configuration is rejected. This is the only failure the service
    /// ever raises; everything after construction is reported through
    /// [`CycleStatus`] and the log.
    pub fn new(
        portal: PortalConfig,
        transport: TransportSession,
        scheduler: Box<dyn TaskScheduler>,
    ) -> Result<Self> {
        Self::with_config(portal, transport, scheduler, ServiceConfig::default())
    }

    /// Build a service for one portal account with explicit tunables.
    pub fn with_config(
        portal: PortalConfig,
        transport: TransportSession,
        scheduler: Box<dyn TaskScheduler>,
        config: ServiceConfig,
    ) -> Result<Self> {
        let api = portal_api_for(portal)?;
        Ok(Self::with_api(api, transport, scheduler, config))
    }

    /// Build the service around a custom portal capability.
    pub fn with_api(
        api: Box<dyn PortalApi>,
        transport: TransportSession,
        scheduler: Box<dyn TaskScheduler>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            session: SessionManager::new(api, transport, config.relogin_interval),
            registry: SubscriptionRegistry::new(),
            scheduler,
            config,
            last_updated: None,
            discovery: None,
        }
    }

    /// Subscribe to changes in `attribute` of inverter `serial`.
    pub fn subscribe(
        &mut self,
        apply: Box<dyn ApplyUpdate>,
        serial: InverterSerial,
        attribute: impl Into<String>,
    ) {
        self.registry
            .subscribe(Subscriber::new(apply), serial, attribute);
    }

    /// Run one polling cycle and re-arm the next one.
    ///
    /// Ensures an authenticated session, fetches a snapshot per inverter and
    /// fans each one out to its subscribers with one shared timestamp. A
    /// failed fetch resets the session so the next cycle logs in afresh; the
    /// remaining inverters of the cycle are still attempted. The next cycle
    /// is scheduled regardless of the outcome, and the session-age check runs
    /// last so a session is never renewed mid-dispatch.
    pub async fn run_cycle(&mut self) -> CycleStatus {
        let mut status = CycleStatus::NotOk;
        let cycle_started = Local::now();

        if self.session.ensure_session().await {
            if let Some(serials) = self.session.api().inverters() {
                for serial in serials {
                    match self.session.api_mut().fetch_inverter_data(&serial).await {
                        Some(data) => {
                            status = CycleStatus::Ok;
                            self.last_updated = Some(cycle_started);
                            self.registry
                                .dispatch(&data, Some(cycle_started), cycle_started);
                        }
                        None => {
                            status = CycleStatus::NotOk;
                            warn!("no data for inverter {}, resetting session", serial);
                            self.session.end_session().await;
                        }
                    }
                }
            } else {
                warn!("portal did not report a device list");
            }
        }

        debug!("scheduling next update in {:?}", self.config.update_interval);
        self.scheduler
            .schedule(ScheduledTask::Update, self.config.update_interval);
        self.session.maybe_renew(Local::now()).await;
        status
    }

    /// Probe attribute capabilities and deliver them to the registered
    /// callback.
    ///
    /// An empty probe (no session, no devices, or no data) schedules exactly
    /// one retry; the registered callback and cookie are left untouched and
    /// are reused by that retry.
    pub async fn discover(&mut self) {
        let capabilities = self.probe_capabilities().await;
        if capabilities.is_empty() {
            warn!(
                "discovery found nothing, scheduling retry in {:?}",
                self.config.discovery_retry_delay
            );
            self.scheduler
                .schedule(ScheduledTask::Discovery, self.config.discovery_retry_delay);
        } else if let Some(registration) = &self.discovery {
            (registration.callback)(&capabilities, &registration.cookie);
        }
    }

    /// Register the discovery callback/cookie and request a probe after
    /// `delay`.
    pub fn schedule_discovery(
        &mut self,
        callback: DiscoveryCallback,
        cookie: DiscoveryCookie,
        delay: Duration,
    ) {
        debug!("scheduling discovery in {:?}", delay);
        self.discovery = Some(DiscoveryRegistration { callback, cookie });
        self.scheduler.schedule(ScheduledTask::Discovery, delay);
    }

    async fn probe_capabilities(&mut self) -> DiscoveryResult {
        let mut capabilities = DiscoveryResult::new();
        if !self.session.ensure_session().await {
            return capabilities;
        }
        let Some(serials) = self.session.api().inverters() else {
            return capabilities;
        };
        for serial in serials {
            if let Some(data) = self.session.api_mut().fetch_inverter_data(&serial).await {
                capabilities.insert(serial, data.keys().cloned().collect());
            }
        }
        capabilities
    }

    /// Portal connectivity, derived live from the capability.
    pub fn status(&self) -> PortalStatus {
        if self.session.is_online() {
            PortalStatus::Online
        } else {
            PortalStatus::Offline
        }
    }

    /// Instant of the last successful update cycle.
    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_status_display() {
        assert_eq!(PortalStatus::Online.to_string(), "Online");
        assert_eq!(PortalStatus::Offline.to_string(), "Offline");
    }
}
