//! (inverter, attribute) → subscriber registry and fan-out dispatch.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use tracing::info;

use solis_api::{AttributeValue, InverterData, InverterSerial, ENERGY_TODAY, INVERTER_STATE};

use crate::correction::{correct_energy_today, Correction};
use crate::subscriber::Subscriber;

/// Routes fetched snapshots to the subscribers registered for them.
#[derive(Default)]
pub struct SubscriptionRegistry {
    subscriptions: HashMap<InverterSerial, HashMap<String, Subscriber>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subscriber` for `attribute` of inverter `serial`.
    ///
    /// Upsert: the last registration for a pair wins. Registrations live for
    /// the process lifetime; there is no unsubscribe.
    pub fn subscribe(
        &mut self,
        subscriber: Subscriber,
        serial: InverterSerial,
        attribute: impl Into<String>,
    ) {
        let attribute = attribute.into();
        info!("subscribing to attribute {} for inverter {}", attribute, serial);
        self.subscriptions
            .entry(serial)
            .or_default()
            .insert(attribute, subscriber);
    }

    /// Fan one snapshot out to every matching subscriber.
    ///
    /// Snapshots for inverters nobody subscribed to are silently ignored.
    /// `measured_at` is the one timestamp shared by every notification of
    /// the cycle; `now` drives the `energy_today` correction.
    pub fn dispatch(
        &mut self,
        data: &InverterData,
        measured_at: Option<DateTime<Local>>,
        now: DateTime<Local>,
    ) {
        let Some(subscribers) = self.subscriptions.get_mut(data.serial()) else {
            return;
        };
        // Captured before the notify loop so the correction outcome does not
        // depend on attribute iteration order.
        let state_measured = subscribers
            .get(INVERTER_STATE)
            .and_then(|subscriber| subscriber.measured());
        for (attribute, value) in data.attributes() {
            let Some(subscriber) = subscribers.get_mut(attribute) else {
                continue;
            };
            let mut value = value.clone();
            if attribute.as_str() == ENERGY_TODAY {
                match correct_energy_today(data.state(), state_measured, now) {
                    Correction::Zero => value = AttributeValue::Number(0.0),
                    Correction::Skip => continue,
                    Correction::Keep => {}
                }
            }
            subscriber.notify(&value, measured_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriber::ApplyUpdate;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture {
        values: Arc<Mutex<Vec<AttributeValue>>>,
    }

    impl Capture {
        fn subscriber(&self) -> Subscriber {
            Subscriber::new(Box::new(self.clone()))
        }

        fn values(&self) -> Vec<AttributeValue> {
            self.values.lock().unwrap().clone()
        }
    }

    impl ApplyUpdate for Capture {
        fn do_update(&mut self, value: &AttributeValue, _: Option<DateTime<Local>>) -> bool {
            self.values.lock().unwrap().push(value.clone());
            true
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 1, hour, minute, 0).unwrap()
    }

    fn snapshot(serial: &str, attributes: &[(&str, f64)]) -> InverterData {
        let attributes = attributes
            .iter()
            .map(|(name, value)| (name.to_string(), AttributeValue::Number(*value)))
            .collect();
        InverterData::new(InverterSerial::new(serial), attributes)
    }

    #[test]
    fn test_dispatch_for_unregistered_inverter_is_noop() {
        let mut registry = SubscriptionRegistry::new();
        let data = snapshot("sn-1", &[(INVERTER_STATE, 3.0), (ENERGY_TODAY, 4.2)]);

        registry.dispatch(&data, Some(at(9, 0)), at(9, 0));
    }

    #[test]
    fn test_dispatch_delivers_subscribed_attributes_only() {
        let mut registry = SubscriptionRegistry::new();
        let power = Capture::default();
        registry.subscribe(power.subscriber(), InverterSerial::new("sn-1"), "power_ac");

        let data = snapshot("sn-1", &[("power_ac", 1500.0), ("temperature", 40.0)]);
        registry.dispatch(&data, Some(at(9, 0)), at(9, 0));

        assert_eq!(power.values(), vec![AttributeValue::Number(1500.0)]);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = SubscriptionRegistry::new();
        let first = Capture::default();
        let second = Capture::default();
        registry.subscribe(first.subscriber(), InverterSerial::new("sn-1"), "power_ac");
        registry.subscribe(second.subscriber(), InverterSerial::new("sn-1"), "power_ac");

        let data = snapshot("sn-1", &[("power_ac", 900.0)]);
        registry.dispatch(&data, Some(at(9, 0)), at(9, 0));

        assert!(first.values().is_empty());
        assert_eq!(second.values(), vec![AttributeValue::Number(900.0)]);
    }

    #[test]
    fn test_energy_today_forced_to_zero_in_standby() {
        let mut registry = SubscriptionRegistry::new();
        let energy = Capture::default();
        registry.subscribe(energy.subscriber(), InverterSerial::new("sn-1"), ENERGY_TODAY);

        let data = snapshot("sn-1", &[(INVERTER_STATE, 2.0), (ENERGY_TODAY, 4.2)]);
        registry.dispatch(&data, Some(at(9, 0)), at(9, 0));

        assert_eq!(energy.values(), vec![AttributeValue::Number(0.0)]);
    }

    #[test]
    fn test_energy_today_passes_through_while_running() {
        let mut registry = SubscriptionRegistry::new();
        let energy = Capture::default();
        registry.subscribe(energy.subscriber(), InverterSerial::new("sn-1"), ENERGY_TODAY);

        let data = snapshot("sn-1", &[(INVERTER_STATE, 3.0), (ENERGY_TODAY, 4.2)]);
        registry.dispatch(&data, Some(at(9, 0)), at(9, 0));

        assert_eq!(energy.values(), vec![AttributeValue::Number(4.2)]);
    }

    #[test]
    fn test_energy_today_zeroed_after_hybrid_midnight_reset() {
        let mut registry = SubscriptionRegistry::new();
        let state = Capture::default();
        let energy = Capture::default();
        registry.subscribe(state.subscriber(), InverterSerial::new("sn-1"), INVERTER_STATE);
        registry.subscribe(energy.subscriber(), InverterSerial::new("sn-1"), ENERGY_TODAY);

        // The state subscriber last applied a measurement just after midnight.
        let midnight = snapshot("sn-1", &[(INVERTER_STATE, 1.0)]);
        registry.dispatch(&midnight, Some(at(0, 5)), at(0, 5));

        let morning = snapshot("sn-1", &[(INVERTER_STATE, 1.0), (ENERGY_TODAY, 6.8)]);
        registry.dispatch(&morning, Some(at(9, 0)), at(9, 0));

        assert_eq!(energy.values(), vec![AttributeValue::Number(0.0)]);
    }

    #[test]
    fn test_energy_today_skipped_within_state_change_grace() {
        let mut registry = SubscriptionRegistry::new();
        let state = Capture::default();
        let energy = Capture::default();
        let power = Capture::default();
        registry.subscribe(state.subscriber(), InverterSerial::new("sn-1"), INVERTER_STATE);
        registry.subscribe(energy.subscriber(), InverterSerial::new("sn-1"), ENERGY_TODAY);
        registry.subscribe(power.subscriber(), InverterSerial::new("sn-1"), "power_ac");

        // State changed two minutes before the current cycle.
        let earlier = snapshot("sn-1", &[(INVERTER_STATE, 1.0)]);
        registry.dispatch(&earlier, Some(at(8, 58)), at(8, 58));

        let current = snapshot(
            "sn-1",
            &[(INVERTER_STATE, 1.0), (ENERGY_TODAY, 6.8), ("power_ac", 120.0)],
        );
        registry.dispatch(&current, Some(at(9, 0)), at(9, 0));

        // The energy counter is skipped entirely; other attributes still flow.
        assert!(energy.values().is_empty());
        assert_eq!(power.values(), vec![AttributeValue::Number(120.0)]);
    }
}
