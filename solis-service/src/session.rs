//! Login lifecycle against the portal capability.

use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use solis_api::{PortalApi, TransportSession};

/// Owns the portal session: when to log in, when to log out, and when a
/// long-lived session must be renewed.
///
/// The authenticated flag is never cached here; it is always read live from
/// the capability. Only the login timestamp is local state.
pub struct SessionManager {
    api: Box<dyn PortalApi>,
    transport: TransportSession,
    login_time: Option<DateTime<Local>>,
    relogin_interval: Duration,
}

impl SessionManager {
    pub fn new(
        api: Box<dyn PortalApi>,
        transport: TransportSession,
        relogin_interval: Duration,
    ) -> Self {
        Self {
            api,
            transport,
            login_time: None,
            relogin_interval,
        }
    }

    /// Make sure the portal session is authenticated.
    ///
    /// Logs in only when the capability reports itself offline, and records
    /// the login instant on success. Returns the capability's live
    /// connectivity flag.
    pub async fn ensure_session(&mut self) -> bool {
        if !self.api.is_online() {
            if self.api.login(&self.transport).await {
                self.login_time = Some(Local::now());
                info!("portal login succeeded");
            }
        }
        self.api.is_online()
    }

    /// Log out and forget the login time.
    ///
    /// The local view is reset unconditionally; a logout the remote side
    /// never saw is not worth failing over.
    pub async fn end_session(&mut self) {
        self.api.logout().await;
        self.login_time = None;
    }

    /// End sessions older than the re-login interval.
    ///
    /// The next `ensure_session` then performs a fresh login. Callers run
    /// this once per update cycle, after dispatch, so a session is never
    /// invalidated mid-cycle.
    pub async fn maybe_renew(&mut self, now: DateTime<Local>) {
        if let Some(login_time) = self.login_time {
            let age = now.signed_duration_since(login_time);
            if age.to_std().is_ok_and(|age| age > self.relogin_interval) {
                debug!("session is {} minutes old, logging out for renewal", age.num_minutes());
                self.end_session().await;
            }
        }
    }

    /// Live connectivity flag of the capability.
    pub fn is_online(&self) -> bool {
        self.api.is_online()
    }

    /// Instant of the last successful login, if any.
    pub fn login_time(&self) -> Option<DateTime<Local>> {
        self.login_time
    }

    pub fn api(&self) -> &dyn PortalApi {
        self.api.as_ref()
    }

    pub fn api_mut(&mut self) -> &mut dyn PortalApi {
        self.api.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use solis_api::{InverterData, InverterSerial};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct FakePortal {
        online: Arc<AtomicBool>,
        login_count: Arc<AtomicU32>,
        logout_count: Arc<AtomicU32>,
    }

    #[async_trait]
    impl PortalApi for FakePortal {
        fn is_online(&self) -> bool {
            self.online.load(Ordering::Relaxed)
        }

        async fn login(&mut self, _: &TransportSession) -> bool {
            self.login_count.fetch_add(1, Ordering::Relaxed);
            self.online.store(true, Ordering::Relaxed);
            true
        }

        async fn logout(&mut self) {
            self.logout_count.fetch_add(1, Ordering::Relaxed);
            self.online.store(false, Ordering::Relaxed);
        }

        fn inverters(&self) -> Option<Vec<InverterSerial>> {
            None
        }

        async fn fetch_inverter_data(&mut self, _: &InverterSerial) -> Option<InverterData> {
            None
        }
    }

    fn session_with_fake(relogin_interval: Duration) -> (SessionManager, FakePortal) {
        let portal = FakePortal::default();
        let session = SessionManager::new(
            Box::new(portal.clone()),
            TransportSession::new(),
            relogin_interval,
        );
        (session, portal)
    }

    #[tokio::test]
    async fn test_ensure_session_logs_in_once_while_online() {
        let (mut session, portal) = session_with_fake(Duration::from_secs(7200));

        assert!(session.ensure_session().await);
        assert!(session.ensure_session().await);

        assert_eq!(portal.login_count.load(Ordering::Relaxed), 1);
        assert!(session.login_time().is_some());
    }

    #[tokio::test]
    async fn test_end_session_clears_login_time() {
        let (mut session, portal) = session_with_fake(Duration::from_secs(7200));

        session.ensure_session().await;
        session.end_session().await;

        assert_eq!(portal.logout_count.load(Ordering::Relaxed), 1);
        assert!(session.login_time().is_none());
        assert!(!session.is_online());
    }

    #[tokio::test]
    async fn test_renewal_after_interval_forces_fresh_login() {
        let (mut session, portal) = session_with_fake(Duration::from_secs(7200));

        session.ensure_session().await;
        let login_time = session.login_time().unwrap();

        // One minute short of the interval: nothing happens.
        session
            .maybe_renew(login_time + ChronoDuration::minutes(119))
            .await;
        assert_eq!(portal.logout_count.load(Ordering::Relaxed), 0);

        // Past the interval: the session ends and the next ensure re-logs-in.
        session
            .maybe_renew(login_time + ChronoDuration::minutes(121))
            .await;
        assert_eq!(portal.logout_count.load(Ordering::Relaxed), 1);
        assert!(session.login_time().is_none());

        assert!(session.ensure_session().await);
        assert_eq!(portal.login_count.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_renewal_without_login_is_noop() {
        let (mut session, portal) = session_with_fake(Duration::from_secs(7200));

        session.maybe_renew(Local::now()).await;
        assert_eq!(portal.logout_count.load(Ordering::Relaxed), 0);
    }
}
