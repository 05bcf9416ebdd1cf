//! Correction policy for the daily energy counter.
//!
//! The portal does not reset `energy_today` at local midnight; the counter
//! resets at sunrise when the inverter powers back on. Dashboards that
//! expect a midnight reset would otherwise see yesterday's total all
//! morning. Hybrid systems are the exception and reset just after midnight.

use chrono::{DateTime, Duration, Local, Timelike};

use solis_api::InverterState;

/// Minutes after midnight in which a hybrid system's reset is trusted.
const MIDNIGHT_RESET_WINDOW_MIN: u32 = 15;

/// Grace period between a state change and the counter reset catching up.
const STATE_CHANGE_GRACE_MIN: i64 = 5;

/// Outcome of evaluating the raw `energy_today` reading for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Replace the raw reading with zero.
    Zero,
    /// Do not notify this attribute at all this cycle.
    Skip,
    /// Pass the raw reading through unchanged.
    Keep,
}

/// Decide what to do with the raw `energy_today` reading.
///
/// `state` is the inverter state carried in the same snapshot and
/// `state_measured` the timestamp last applied to the state attribute's
/// subscriber. Only mornings need correcting; once the inverter has been
/// generating for a while the counter is reliable.
///
/// The `Skip` outcome exists for the window right after a morning state
/// change: the state notification and the counter reset race each other on
/// the portal side, and reporting the stale counter would be wrong in either
/// direction.
pub fn correct_energy_today(
    state: Option<InverterState>,
    state_measured: Option<DateTime<Local>>,
    now: DateTime<Local>,
) -> Correction {
    if now.hour() >= 12 {
        return Correction::Keep;
    }
    match state {
        Some(InverterState::Standby) => Correction::Zero,
        Some(InverterState::Starting) => match state_measured {
            None => Correction::Keep,
            Some(measured) => {
                if measured.hour() == 0 && measured.minute() < MIDNIGHT_RESET_WINDOW_MIN {
                    // Hybrid system, already reset just after midnight.
                    Correction::Zero
                } else if measured + Duration::minutes(STATE_CHANGE_GRACE_MIN) > now {
                    Correction::Skip
                } else {
                    Correction::Keep
                }
            }
        },
        _ => Correction::Keep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 1, hour, minute, 0).unwrap()
    }

    #[rstest]
    #[case::standby_morning(Some(InverterState::Standby), None, at(9, 0), Correction::Zero)]
    #[case::standby_afternoon(Some(InverterState::Standby), None, at(14, 0), Correction::Keep)]
    #[case::running_morning(Some(InverterState::Running), None, at(9, 0), Correction::Keep)]
    #[case::unknown_code(Some(InverterState::Unknown(9)), None, at(9, 0), Correction::Keep)]
    #[case::no_state(None, None, at(9, 0), Correction::Keep)]
    #[case::starting_without_history(Some(InverterState::Starting), None, at(9, 0), Correction::Keep)]
    #[case::starting_hybrid_midnight_reset(
        Some(InverterState::Starting),
        Some(at(0, 5)),
        at(9, 0),
        Correction::Zero
    )]
    #[case::starting_midnight_window_edge(
        Some(InverterState::Starting),
        Some(at(0, 15)),
        at(9, 0),
        Correction::Keep
    )]
    #[case::starting_within_grace_window(
        Some(InverterState::Starting),
        Some(at(8, 58)),
        at(9, 0),
        Correction::Skip
    )]
    #[case::starting_after_grace_window(
        Some(InverterState::Starting),
        Some(at(8, 40)),
        at(9, 0),
        Correction::Keep
    )]
    #[case::starting_afternoon(
        Some(InverterState::Starting),
        Some(at(13, 58)),
        at(14, 0),
        Correction::Keep
    )]
    fn test_correction_outcomes(
        #[case] state: Option<InverterState>,
        #[case] state_measured: Option<DateTime<Local>>,
        #[case] now: DateTime<Local>,
        #[case] expected: Correction,
    ) {
        assert_eq!(correct_energy_today(state, state_measured, now), expected);
    }

    #[test]
    fn test_grace_window_boundary_is_exclusive() {
        // Exactly five minutes old: measured + grace == now, not in the future.
        let outcome = correct_energy_today(
            Some(InverterState::Starting),
            Some(at(8, 55)),
            at(9, 0),
        );
        assert_eq!(outcome, Correction::Keep);
    }
}
