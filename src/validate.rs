//! Schema check applied to rendered notifications before delivery.
//!
//! The check runs on the serialized notification, so it sees exactly the
//! fields a consumer of the JSON would see. Unknown fields are allowed.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

use crate::render::Notification;

pub const MIN_TWEET_LENGTH: usize = 20;
pub const MAX_TWEET_LENGTH: usize = 140;

static FLIGHT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{2}\d+").expect("valid flight number pattern"));
static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("valid clock time pattern"));

/// Fields that only an arrival carries.
const ARRIVAL_FIELDS: [(&str, FieldKind); 3] = [
    ("departureAirport", FieldKind::Airport),
    ("estimatedArrival", FieldKind::Time),
    ("scheduledArrival", FieldKind::Time),
];
/// Fields that only a departure carries.
const DEPARTURE_FIELDS: [(&str, FieldKind); 3] = [
    ("arrivalAirport", FieldKind::Airport),
    ("estimatedDeparture", FieldKind::Time),
    ("scheduledDeparture", FieldKind::Time),
];

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Airport,
    Time,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("notification failed validation: {}", .violations.join("; "))]
pub struct SchemaError {
    pub violations: Vec<String>,
}

/// Validates a rendered notification.
pub fn validate(notification: &Notification) -> Result<(), SchemaError> {
    let value = serde_json::to_value(notification).map_err(|e| SchemaError {
        violations: vec![format!("not serializable: {e}")],
    })?;
    validate_value(&value)
}

/// Validates the JSON form of a notification.
pub fn validate_value(value: &Value) -> Result<(), SchemaError> {
    let Some(object) = value.as_object() else {
        return Err(SchemaError {
            violations: vec!["notification must be an object".to_string()],
        });
    };

    let mut violations = Vec::new();

    match object.get("tweet").and_then(Value::as_str) {
        Some(tweet) => {
            let length = tweet.chars().count();
            if !(MIN_TWEET_LENGTH..=MAX_TWEET_LENGTH).contains(&length) {
                violations.push(format!(
                    "tweet length {length} outside {MIN_TWEET_LENGTH}..={MAX_TWEET_LENGTH}"
                ));
            }
        }
        None => violations.push("tweet is required".to_string()),
    }

    require_text(object, "status_type", &mut violations);
    require_text(object, "airlineName", &mut violations);

    match object.get("flightNumber").and_then(Value::as_str) {
        Some(number) if FLIGHT_NUMBER.is_match(number) => {}
        Some(number) => violations.push(format!("flightNumber `{number}` is malformed")),
        None => violations.push("flightNumber is required".to_string()),
    }

    if let Some(diff) = object.get("diff") {
        if !diff.is_number() {
            violations.push("diff must be a number".to_string());
        }
    }
    if let Some(terminal) = object.get("terminal") {
        if !terminal.is_string() {
            violations.push("terminal must be a string".to_string());
        }
    }
    if let Some(gate) = object.get("gate") {
        if !is_numeric(gate) {
            violations.push(format!("gate {gate} must be numeric"));
        }
    }
    if let Some(via) = object.get("viaAirport") {
        check_airport("viaAirport", via, &mut violations);
    }

    let (required, forbidden) = match object.get("type").and_then(Value::as_str) {
        Some("arrival") => (ARRIVAL_FIELDS, DEPARTURE_FIELDS),
        Some("departure") => (DEPARTURE_FIELDS, ARRIVAL_FIELDS),
        _ => {
            violations.push("type must be `arrival` or `departure`".to_string());
            return finish(violations);
        }
    };

    for (field, kind) in required {
        match object.get(field) {
            Some(value) => check_field(field, kind, value, &mut violations),
            None => violations.push(format!("{field} is required")),
        }
    }
    for (field, _) in forbidden {
        if object.contains_key(field) {
            violations.push(format!("{field} is not allowed"));
        }
    }

    finish(violations)
}

fn finish(violations: Vec<String>) -> Result<(), SchemaError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaError { violations })
    }
}

fn require_text(object: &Map<String, Value>, field: &str, violations: &mut Vec<String>) {
    match object.get(field).and_then(Value::as_str) {
        Some(text) if !text.is_empty() => {}
        _ => violations.push(format!("{field} is required")),
    }
}

fn check_field(field: &str, kind: FieldKind, value: &Value, violations: &mut Vec<String>) {
    match kind {
        FieldKind::Airport => check_airport(field, value, violations),
        FieldKind::Time => match value.as_str() {
            Some(time) if CLOCK_TIME.is_match(time) => {}
            _ => violations.push(format!("{field} must be HH:MM, got {value}")),
        },
    }
}

fn check_airport(field: &str, value: &Value, violations: &mut Vec<String>) {
    let Some(airport) = value.as_object() else {
        violations.push(format!("{field} must be an object"));
        return;
    };

    match airport.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => {}
        _ => violations.push(format!("{field}.name is required")),
    }

    if let Some(code) = airport.get("code").filter(|code| code.as_str() != Some("")) {
        if code.as_str().is_none_or(|code| code.chars().count() != 3) {
            violations.push(format!("{field}.code must be a 3-letter code"));
        }
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(text) => text.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn departure_notification(tweet: &str) -> Value {
        json!({
            "tweet": tweet,
            "tweet_length": tweet.chars().count(),
            "status_type": "initial_delayed_departure",
            "diff": 35,
            "type": "departure",
            "flightNumber": "LG4711",
            "airlineName": "Luxair",
            "scheduledDeparture": "10:00",
            "estimatedDeparture": "10:35",
            "arrivalAirport": { "code": "CDG", "name": "Paris" },
            "gate": "12",
            "terminal": "A"
        })
    }

    #[test]
    fn test_valid_departure() {
        let value = departure_notification(
            "Luxair flight #LG4711 to Paris #CDG is expected to depart 35 minutes late at 10:35.",
        );
        assert_eq!(validate_value(&value), Ok(()));
    }

    #[test]
    fn test_tweet_length_bounds() {
        assert!(validate_value(&departure_notification("too short")).is_err());
        assert!(validate_value(&departure_notification(&"x".repeat(141))).is_err());
        assert!(validate_value(&departure_notification(&"x".repeat(140))).is_ok());
        assert!(validate_value(&departure_notification(&"x".repeat(20))).is_ok());
    }

    #[test]
    fn test_other_direction_fields_are_forbidden() {
        let mut value = departure_notification("Luxair flight #LG4711 is expected to depart late.");
        value["scheduledArrival"] = json!("12:00");

        let err = validate_value(&value).unwrap_err();

        assert_eq!(err.violations, vec!["scheduledArrival is not allowed"]);
    }

    #[test]
    fn test_empty_airport_code_counts_as_absent() {
        let mut value = departure_notification("Luxair flight #LG4711 to Paris is expected to depart late.");
        value["arrivalAirport"]["code"] = json!("");
        assert_eq!(validate_value(&value), Ok(()));

        value["arrivalAirport"]["code"] = json!("CD");
        assert!(validate_value(&value).is_err());
    }

    #[test]
    fn test_direction_fields_are_required() {
        let mut value = departure_notification("Luxair flight #LG4711 is expected to depart late.");
        value.as_object_mut().unwrap().remove("arrivalAirport");

        let err = validate_value(&value).unwrap_err();

        assert_eq!(err.violations, vec!["arrivalAirport is required"]);
    }

    #[test]
    fn test_malformed_fields_are_all_reported() {
        let mut value = departure_notification("Luxair flight #LG4711 is expected to depart late.");
        value["flightNumber"] = json!("lg 4711");
        value["estimatedDeparture"] = json!("10h35");
        value["arrivalAirport"] = json!({ "code": "LFPG", "name": "Paris" });
        value["gate"] = json!("B");

        let err = validate_value(&value).unwrap_err();

        assert_eq!(err.violations.len(), 4);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let mut value = departure_notification("Luxair flight #LG4711 is expected to depart late.");
        value["type"] = json!("transit");

        assert!(validate_value(&value).is_err());
    }
}
