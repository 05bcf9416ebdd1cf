//! Subscriber contract with timestamp-based de-duplication.

use chrono::{DateTime, Local};

use solis_api::AttributeValue;

/// Applies one attribute update to a concrete target.
///
/// Implementors never see the same timestamp twice once they have accepted
/// it; de-duplication happens in [`Subscriber::notify`] before this trait is
/// reached.
pub trait ApplyUpdate: Send {
    /// Apply `value`, measured at `measured_at`, to the target.
    ///
    /// Return `true` when the value was accepted. Returning `false` (for
    /// example on an out-of-range reading) leaves the de-duplication state
    /// untouched, so the same timestamp is offered again next time.
    fn do_update(&mut self, value: &AttributeValue, measured_at: Option<DateTime<Local>>) -> bool;
}

/// A registered notification target for one (inverter, attribute) pair.
///
/// All dispatch goes through [`Subscriber::notify`]; the boxed
/// [`ApplyUpdate`] cannot be reached any other way, which is what enforces
/// the at-most-once-per-timestamp guarantee.
pub struct Subscriber {
    apply: Box<dyn ApplyUpdate>,
    measured: Option<DateTime<Local>>,
}

impl Subscriber {
    /// Wrap an update target into a subscriber with no measurement applied
    /// yet.
    pub fn new(apply: Box<dyn ApplyUpdate>) -> Self {
        Self {
            apply,
            measured: None,
        }
    }

    /// Timestamp of the last measurement the target accepted.
    pub fn measured(&self) -> Option<DateTime<Local>> {
        self.measured
    }

    /// Offer a value measured at `measured_at` to the target.
    ///
    /// A notification carrying the timestamp already applied (including both
    /// being unset) is dropped without reaching the target. The stored
    /// timestamp only advances when the target reports the value as applied,
    /// so a refused value can be retried at the same timestamp.
    pub fn notify(&mut self, value: &AttributeValue, measured_at: Option<DateTime<Local>>) {
        if self.measured == measured_at {
            return;
        }
        if self.apply.do_update(value, measured_at) {
            self.measured = measured_at;
        }
    }
}
