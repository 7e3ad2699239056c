//! Flight records as observed at one poll.
//!
//! A [`FlightRecord`] describes one leg (arrival or departure) of a flight at
//! the monitored airport. The direction-specific fields live in [`Leg`], which
//! is tagged by `type` in JSON, so a record carries exactly one of the
//! arrival or departure time/airport pairs.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Which leg a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Arrival,
    Departure,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Arrival => f.write_str("arrival"),
            Direction::Departure => f.write_str("departure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    /// IATA code; blank upstream values are read as absent.
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub code: Option<String>,
    pub name: String,
}

impl Airport {
    pub fn new(code: Option<&str>, name: &str) -> Self {
        Self {
            code: code.filter(|code| !code.trim().is_empty()).map(str::to_string),
            name: name.to_string(),
        }
    }
}

/// Direction-specific part of a record: clock times (`HH:MM`) for the
/// monitored airport and the counterpart airport at the other end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Leg {
    #[serde(rename_all = "camelCase")]
    Arrival {
        scheduled_arrival: String,
        estimated_arrival: String,
        departure_airport: Airport,
    },
    #[serde(rename_all = "camelCase")]
    Departure {
        scheduled_departure: String,
        estimated_departure: String,
        arrival_airport: Airport,
    },
}

/// One observation of one flight leg at one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    #[serde(flatten)]
    pub leg: Leg,
    pub flight_number: String,
    #[serde(default)]
    pub airline_name: String,
    #[serde(rename = "airlineIATA", default)]
    pub airline_iata: String,
    #[serde(default)]
    pub flight_status: String,
    #[serde(default)]
    pub flight_status_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_airport: Option<Airport>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub gate: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub terminal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft_type: Option<String>,
}

/// The full set of known legs as of one poll cycle.
pub type Snapshot = Vec<FlightRecord>;

/// Status codes of legs that are already complete at the monitored airport.
const COMPLETED_STATUS_CODES: &[&str] = &["ARR", "DEP"];

impl FlightRecord {
    /// A departure towards `destination` with no status information yet.
    pub fn departure(
        flight_number: &str,
        airline_name: &str,
        destination: Airport,
        scheduled: &str,
        estimated: &str,
    ) -> Self {
        Self::with_leg(
            Leg::Departure {
                scheduled_departure: scheduled.to_string(),
                estimated_departure: estimated.to_string(),
                arrival_airport: destination,
            },
            flight_number,
            airline_name,
        )
    }

    /// An arrival from `origin` with no status information yet.
    pub fn arrival(
        flight_number: &str,
        airline_name: &str,
        origin: Airport,
        scheduled: &str,
        estimated: &str,
    ) -> Self {
        Self::with_leg(
            Leg::Arrival {
                scheduled_arrival: scheduled.to_string(),
                estimated_arrival: estimated.to_string(),
                departure_airport: origin,
            },
            flight_number,
            airline_name,
        )
    }

    fn with_leg(leg: Leg, flight_number: &str, airline_name: &str) -> Self {
        Self {
            leg,
            flight_number: flight_number.to_string(),
            airline_name: airline_name.to_string(),
            airline_iata: flight_number.chars().take(2).collect(),
            flight_status: "Expected".to_string(),
            flight_status_code: "PLN".to_string(),
            via_airport: None,
            gate: None,
            terminal: None,
            aircraft_type: None,
        }
    }

    pub fn with_status(mut self, status: &str, code: &str) -> Self {
        self.flight_status = status.to_string();
        self.flight_status_code = code.to_string();
        self
    }

    pub fn with_gate(mut self, terminal: &str, gate: &str) -> Self {
        self.terminal = Some(terminal.to_string());
        self.gate = Some(gate.to_string());
        self
    }

    pub fn with_via(mut self, via: Airport) -> Self {
        self.via_airport = Some(via);
        self
    }

    pub fn direction(&self) -> Direction {
        match self.leg {
            Leg::Arrival { .. } => Direction::Arrival,
            Leg::Departure { .. } => Direction::Departure,
        }
    }

    pub fn scheduled_time(&self) -> &str {
        match &self.leg {
            Leg::Arrival {
                scheduled_arrival, ..
            } => scheduled_arrival,
            Leg::Departure {
                scheduled_departure,
                ..
            } => scheduled_departure,
        }
    }

    pub fn estimated_time(&self) -> &str {
        match &self.leg {
            Leg::Arrival {
                estimated_arrival, ..
            } => estimated_arrival,
            Leg::Departure {
                estimated_departure,
                ..
            } => estimated_departure,
        }
    }

    /// The airport at the other end of this leg.
    pub fn counterpart_airport(&self) -> &Airport {
        match &self.leg {
            Leg::Arrival {
                departure_airport, ..
            } => departure_airport,
            Leg::Departure {
                arrival_airport, ..
            } => arrival_airport,
        }
    }

    /// Identity used to match a record across polls.
    pub fn key(&self) -> (Direction, &str) {
        (self.direction(), &self.flight_number)
    }

    pub fn is_cancelled(&self) -> bool {
        self.flight_status == "Cancelled"
    }

    /// Whether the leg has already landed or taken off.
    pub fn is_completed(&self) -> bool {
        COMPLETED_STATUS_CODES.contains(&self.flight_status_code.as_str())
    }
}

/// Accepts gate/terminal values sent either as strings or as bare numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.and_then(|value| match value {
            StringOrNumber::Text(text) if text.trim().is_empty() => None,
            StringOrNumber::Text(text) => Some(text),
            StringOrNumber::Number(number) => Some(number.to_string()),
        }),
    )
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|text| !text.trim().is_empty()))
}
