//! Notification text for classified events.
//!
//! Each status category maps onto exactly one template. Cancellations quote
//! the scheduled time; delays and early legs quote the estimated time and the
//! deviation in minutes.

use serde::Serialize;
use thiserror::Error;

use crate::classify::{ClassifiedEvent, Drift, StatusType};
use crate::flight::{Airport, Direction, FlightRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("no notification template for status type `{0}`")]
    NoTemplate(StatusType),
    #[error("status type `{status_type}` does not apply to {direction} {flight_number}")]
    DirectionMismatch {
        status_type: StatusType,
        direction: Direction,
        flight_number: String,
    },
    #[error("status type `{status_type}` of {flight_number} has no deviation")]
    MissingDeviation {
        status_type: StatusType,
        flight_number: String,
    },
}

/// A rendered announcement, ready for validation and delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub tweet: String,
    pub tweet_length: usize,
    #[serde(flatten)]
    pub event: ClassifiedEvent,
}

impl Notification {
    pub fn flight(&self) -> &FlightRecord {
        &self.event.flight.flight
    }
}

pub fn render(event: ClassifiedEvent) -> Result<Notification, RenderError> {
    let tweet = match event.status_type {
        StatusType::AsScheduled => return Err(RenderError::NoTemplate(event.status_type)),
        StatusType::Cancelled => render_cancelled(&event.flight.flight),
        StatusType::InitialDelayedDeparture
        | StatusType::InitialEarlyDeparture
        | StatusType::ChangeDelayedDeparture
        | StatusType::ChangeEarlyDeparture => render_departure(&event, Direction::Departure)?,
        StatusType::InitialDelayedArrival
        | StatusType::InitialEarlyArrival
        | StatusType::ChangeDelayedArrival
        | StatusType::ChangeEarlyArrival => render_arrival(&event, Direction::Arrival)?,
    };

    Ok(Notification {
        tweet_length: tweet.chars().count(),
        tweet,
        event,
    })
}

fn render_cancelled(record: &FlightRecord) -> String {
    let preposition = match record.direction() {
        Direction::Departure => "to",
        Direction::Arrival => "from",
    };

    format!(
        "{} flight #{} {} {}{} at {} has been cancelled.",
        record.airline_name,
        record.flight_number,
        preposition,
        airport_label(record.counterpart_airport()),
        via_clause(record),
        record.scheduled_time(),
    )
}

fn render_departure(event: &ClassifiedEvent, expected: Direction) -> Result<String, RenderError> {
    let (record, diff) = deviating_leg(event, expected)?;

    Ok(format!(
        "{} flight #{} to {}{} is expected to depart {} {} at {}{}.",
        record.airline_name,
        record.flight_number,
        airport_label(record.counterpart_airport()),
        via_clause(record),
        minutes_phrase(diff),
        late_or_early(diff),
        record.estimated_time(),
        gate_clause(record),
    ))
}

fn render_arrival(event: &ClassifiedEvent, expected: Direction) -> Result<String, RenderError> {
    let (record, diff) = deviating_leg(event, expected)?;

    Ok(format!(
        "{} flight #{} from {}{} is expected to arrive {} {} at {}.",
        record.airline_name,
        record.flight_number,
        airport_label(record.counterpart_airport()),
        via_clause(record),
        minutes_phrase(diff),
        late_or_early(diff),
        record.estimated_time(),
    ))
}

fn deviating_leg(
    event: &ClassifiedEvent,
    expected: Direction,
) -> Result<(&FlightRecord, i64), RenderError> {
    let record = &event.flight.flight;

    if record.direction() != expected {
        return Err(RenderError::DirectionMismatch {
            status_type: event.status_type,
            direction: record.direction(),
            flight_number: record.flight_number.clone(),
        });
    }

    let diff = event.diff.ok_or_else(|| RenderError::MissingDeviation {
        status_type: event.status_type,
        flight_number: record.flight_number.clone(),
    })?;

    Ok((record, diff))
}

fn airport_label(airport: &Airport) -> String {
    match airport.code.as_deref() {
        Some(code) if !code.is_empty() => format!("{} #{}", airport.name, code),
        _ => airport.name.clone(),
    }
}

fn via_clause(record: &FlightRecord) -> String {
    record
        .via_airport
        .as_ref()
        .map(|via| format!(" via {}", airport_label(via)))
        .unwrap_or_default()
}

fn gate_clause(record: &FlightRecord) -> String {
    match (&record.terminal, &record.gate) {
        (Some(terminal), Some(gate)) => format!(" from gate {terminal}{gate}"),
        _ => String::new(),
    }
}

/// `1 minute`, otherwise `N minutes`, using the magnitude of `diff`.
pub fn minutes_phrase(diff: i64) -> String {
    let minutes = diff.unsigned_abs();
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{minutes} minutes")
    }
}

fn late_or_early(diff: i64) -> &'static str {
    match Drift::of(diff) {
        Drift::Early => "early",
        Drift::Delayed => "late",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::diff::DiffedFlight;

    fn event(record: FlightRecord) -> ClassifiedEvent {
        classify(DiffedFlight::new_leg(record))
    }

    fn paris_departure(estimated: &str) -> FlightRecord {
        FlightRecord::departure(
            "LG4711",
            "Luxair",
            Airport::new(Some("CDG"), "Paris"),
            "10:00",
            estimated,
        )
    }

    #[test]
    fn test_minutes_phrase_pluralization() {
        assert_eq!(minutes_phrase(1), "1 minute");
        assert_eq!(minutes_phrase(-1), "1 minute");
        assert_eq!(minutes_phrase(0), "0 minutes");
        assert_eq!(minutes_phrase(-45), "45 minutes");
    }

    #[test]
    fn test_delayed_departure_with_gate() {
        let record = paris_departure("10:35").with_gate("A", "12");

        let notification = render(event(record)).unwrap();

        assert_eq!(
            notification.tweet,
            "Luxair flight #LG4711 to Paris #CDG is expected to depart 35 minutes late at 10:35 from gate A12."
        );
        assert_eq!(notification.tweet_length, notification.tweet.chars().count());
    }

    #[test]
    fn test_gate_clause_needs_terminal_and_gate() {
        let mut record = paris_departure("10:35");
        record.gate = Some("12".to_string());

        let notification = render(event(record)).unwrap();

        assert!(!notification.tweet.contains("gate"));
    }

    #[test]
    fn test_early_arrival_with_via() {
        let record = FlightRecord::arrival(
            "LG8012",
            "Luxair",
            Airport::new(None, "Munich"),
            "18:00",
            "17:40",
        )
        .with_via(Airport::new(Some("SXB"), "Strasbourg"));

        let notification = render(event(record)).unwrap();

        assert_eq!(
            notification.tweet,
            "Luxair flight #LG8012 from Munich via Strasbourg #SXB is expected to arrive 20 minutes early at 17:40."
        );
    }

    #[test]
    fn test_cancelled_departure_uses_scheduled_time() {
        let record = paris_departure("11:30").with_status("Cancelled", "CNX");

        let notification = render(event(record)).unwrap();

        assert_eq!(
            notification.tweet,
            "Luxair flight #LG4711 to Paris #CDG at 10:00 has been cancelled."
        );
    }

    #[test]
    fn test_cancelled_arrival() {
        let record = FlightRecord::arrival(
            "LH390",
            "Lufthansa",
            Airport::new(Some("FRA"), "Frankfurt"),
            "21:05",
            "21:05",
        )
        .with_status("Cancelled", "CNX");

        let notification = render(event(record)).unwrap();

        assert_eq!(
            notification.tweet,
            "Lufthansa flight #LH390 from Frankfurt #FRA at 21:05 has been cancelled."
        );
    }

    #[test]
    fn test_as_scheduled_has_no_template() {
        let result = render(event(paris_departure("10:05")));
        assert_eq!(result, Err(RenderError::NoTemplate(StatusType::AsScheduled)));
    }

    #[test]
    fn test_mismatched_direction_is_rejected() {
        let mut classified = event(paris_departure("10:45"));
        classified.status_type = StatusType::InitialDelayedArrival;

        assert!(matches!(
            render(classified),
            Err(RenderError::DirectionMismatch { .. })
        ));
    }
}
