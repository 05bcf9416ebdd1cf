//! Host scheduling capability.

use std::time::Duration;

/// A cycle the engine wants invoked again later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduledTask {
    /// Invoke [`InverterService::run_cycle`](crate::InverterService::run_cycle).
    Update,
    /// Invoke [`InverterService::discover`](crate::InverterService::discover).
    Discovery,
}

/// Arranges for an engine entry point to run at a future instant.
///
/// The host owns the timer primitive; the engine only records the request,
/// which keeps the re-arming visible and testable. Each cycle schedules its
/// own successor at completion, so at most one invocation per task kind is
/// outstanding and cycles never overlap. A scheduled invocation cannot be
/// revoked.
pub trait TaskScheduler: Send {
    /// Request `task` to be invoked `delay` from now.
    fn schedule(&mut self, task: ScheduledTask, delay: Duration);
}
