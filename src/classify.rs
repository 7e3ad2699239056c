//! Status-event classification of diffed legs.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use std::fmt;

use crate::diff::DiffedFlight;
use crate::flight::Direction;

/// Minimum absolute deviation for an arrival to be reported.
pub const ARRIVAL_THRESHOLD_MINUTES: i64 = 15;
/// Minimum absolute deviation for a departure to be reported.
pub const DEPARTURE_THRESHOLD_MINUTES: i64 = 30;
/// An estimate earlier than this before the schedule is taken as next day.
const ROLLOVER_WINDOW_MINUTES: i64 = 6 * 60;
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Whether a deviation is seen for the first time or re-observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Initial,
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drift {
    Early,
    Delayed,
}

impl Drift {
    /// Sign convention: zero and negative deviations count as early.
    pub fn of(deviation: i64) -> Self {
        if deviation <= 0 {
            Drift::Early
        } else {
            Drift::Delayed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusType {
    AsScheduled,
    Cancelled,
    InitialDelayedDeparture,
    InitialEarlyDeparture,
    ChangeDelayedDeparture,
    ChangeEarlyDeparture,
    InitialDelayedArrival,
    InitialEarlyArrival,
    ChangeDelayedArrival,
    ChangeEarlyArrival,
}

impl StatusType {
    pub fn deviation(stage: Stage, drift: Drift, direction: Direction) -> Self {
        use Direction::{Arrival, Departure};
        use Drift::{Delayed, Early};
        use Stage::{Change, Initial};

        match (stage, drift, direction) {
            (Initial, Delayed, Departure) => StatusType::InitialDelayedDeparture,
            (Initial, Early, Departure) => StatusType::InitialEarlyDeparture,
            (Change, Delayed, Departure) => StatusType::ChangeDelayedDeparture,
            (Change, Early, Departure) => StatusType::ChangeEarlyDeparture,
            (Initial, Delayed, Arrival) => StatusType::InitialDelayedArrival,
            (Initial, Early, Arrival) => StatusType::InitialEarlyArrival,
            (Change, Delayed, Arrival) => StatusType::ChangeDelayedArrival,
            (Change, Early, Arrival) => StatusType::ChangeEarlyArrival,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusType::AsScheduled => "as_scheduled",
            StatusType::Cancelled => "cancelled",
            StatusType::InitialDelayedDeparture => "initial_delayed_departure",
            StatusType::InitialEarlyDeparture => "initial_early_departure",
            StatusType::ChangeDelayedDeparture => "change_delayed_departure",
            StatusType::ChangeEarlyDeparture => "change_early_departure",
            StatusType::InitialDelayedArrival => "initial_delayed_arrival",
            StatusType::InitialEarlyArrival => "initial_early_arrival",
            StatusType::ChangeDelayedArrival => "change_delayed_arrival",
            StatusType::ChangeEarlyArrival => "change_early_arrival",
        }
    }

    /// Everything except `as_scheduled` produces a notification.
    pub fn is_reportable(self) -> bool {
        self != StatusType::AsScheduled
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diffed leg with its status category and deviation in minutes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedEvent {
    #[serde(flatten)]
    pub flight: DiffedFlight,
    pub status_type: StatusType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<i64>,
}

fn minutes_of_day(clock: &str) -> Option<i64> {
    let time = NaiveTime::parse_from_str(clock.trim(), "%H:%M").ok()?;
    Some(i64::from(time.num_seconds_from_midnight() / 60))
}

/// Signed minutes from `scheduled` to `estimated`, both `HH:MM` clock times
/// of the same day unless the estimate rolls over past midnight.
pub fn deviation_minutes(scheduled: &str, estimated: &str) -> Option<i64> {
    let scheduled = minutes_of_day(scheduled)?;
    let mut estimated = minutes_of_day(estimated)?;

    if estimated < scheduled - ROLLOVER_WINDOW_MINUTES {
        estimated += MINUTES_PER_DAY;
    }

    Some(estimated - scheduled)
}

pub fn threshold_minutes(direction: Direction) -> i64 {
    match direction {
        Direction::Arrival => ARRIVAL_THRESHOLD_MINUTES,
        Direction::Departure => DEPARTURE_THRESHOLD_MINUTES,
    }
}

/// Assigns a status category to a diffed leg.
pub fn classify(flight: DiffedFlight) -> ClassifiedEvent {
    if flight.flight.is_cancelled() {
        return ClassifiedEvent {
            flight,
            status_type: StatusType::Cancelled,
            diff: None,
        };
    }

    let record = &flight.flight;
    let direction = record.direction();
    let diff = deviation_minutes(record.scheduled_time(), record.estimated_time());

    let status_type = match diff {
        Some(minutes) if minutes.abs() >= threshold_minutes(direction) => {
            let stage = if flight.changes.is_empty() {
                Stage::Initial
            } else {
                Stage::Change
            };
            StatusType::deviation(stage, Drift::of(minutes), direction)
        }
        _ => StatusType::AsScheduled,
    };

    ClassifiedEvent {
        flight,
        status_type,
        diff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::find_changes;
    use crate::flight::{Airport, FlightRecord};

    fn departure(scheduled: &str, estimated: &str) -> FlightRecord {
        FlightRecord::departure(
            "LG4711",
            "Luxair",
            Airport::new(Some("CDG"), "Paris"),
            scheduled,
            estimated,
        )
        .with_status("Expected", "EXP")
    }

    fn arrival(scheduled: &str, estimated: &str) -> FlightRecord {
        FlightRecord::arrival(
            "LG8012",
            "Luxair",
            Airport::new(Some("MUC"), "Munich"),
            scheduled,
            estimated,
        )
        .with_status("Estimated", "EXP")
    }

    #[test]
    fn test_deviation_sign() {
        assert_eq!(deviation_minutes("10:00", "10:35"), Some(35));
        assert_eq!(deviation_minutes("10:00", "09:40"), Some(-20));
        assert_eq!(deviation_minutes("10:00", "10:00"), Some(0));
    }

    #[test]
    fn test_deviation_midnight_rollover() {
        assert_eq!(deviation_minutes("23:50", "00:10"), Some(20));
        assert_eq!(deviation_minutes("22:00", "01:30"), Some(210));
    }

    #[test]
    fn test_deviation_within_rollover_window_stays_same_day() {
        assert_eq!(deviation_minutes("12:00", "06:00"), Some(-360));
        assert_eq!(deviation_minutes("12:00", "05:59"), Some(1079));
    }

    #[test]
    fn test_deviation_unparseable() {
        assert_eq!(deviation_minutes("", "10:00"), None);
        assert_eq!(deviation_minutes("10:00", "soon"), None);
    }

    #[test]
    fn test_departure_threshold_is_inclusive_at_30() {
        let at = classify(DiffedFlight::new_leg(departure("10:00", "10:30")));
        let below = classify(DiffedFlight::new_leg(departure("10:00", "10:29")));

        assert_eq!(at.status_type, StatusType::InitialDelayedDeparture);
        assert_eq!(below.status_type, StatusType::AsScheduled);
        assert_eq!(below.diff, Some(29));
    }

    #[test]
    fn test_arrival_threshold_is_inclusive_at_15() {
        let late = classify(DiffedFlight::new_leg(arrival("10:00", "10:15")));
        let early = classify(DiffedFlight::new_leg(arrival("10:00", "09:45")));
        let below = classify(DiffedFlight::new_leg(arrival("10:00", "09:46")));

        assert_eq!(late.status_type, StatusType::InitialDelayedArrival);
        assert_eq!(early.status_type, StatusType::InitialEarlyArrival);
        assert_eq!(early.diff, Some(-15));
        assert_eq!(below.status_type, StatusType::AsScheduled);
    }

    #[test]
    fn test_reobserved_deviation_is_a_change() {
        let diffed = find_changes(&[departure("10:00", "10:35")], &[departure("10:00", "11:10")])
            .unwrap()
            .remove(0);

        let event = classify(diffed);

        assert_eq!(event.status_type, StatusType::ChangeDelayedDeparture);
        assert_eq!(event.diff, Some(70));
    }

    #[test]
    fn test_cancelled_ignores_deviation() {
        let record = departure("10:00", "13:00").with_status("Cancelled", "CNX");

        let event = classify(DiffedFlight::new_leg(record));

        assert_eq!(event.status_type, StatusType::Cancelled);
        assert_eq!(event.diff, None);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let diffed = DiffedFlight::new_leg(arrival("23:50", "00:10"));

        let first = classify(diffed.clone());
        let second = classify(diffed);

        assert_eq!(first.status_type, second.status_type);
        assert_eq!(first.diff, second.diff);
        assert_eq!(first.diff, Some(20));
    }

    #[test]
    fn test_status_type_serializes_snake_case() {
        let value = serde_json::to_value(StatusType::ChangeEarlyArrival).unwrap();
        assert_eq!(value, "change_early_arrival");
        assert_eq!(StatusType::ChangeEarlyArrival.to_string(), "change_early_arrival");
    }
}
