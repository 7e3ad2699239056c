//! Per-source record shape adjustment.
//!
//! The carrier API reports flight numbers as `LG-0123` and airline names in
//! several marketing variants; the airport board repeats the carrier's own
//! flights, which the carrier API already covers.

use regex::Regex;
use std::sync::LazyLock;

use crate::flight::FlightRecord;

/// Airline names starting with a marketing prefix, and the short name they
/// are reported under.
static CARRIER_ALIASES: &[(&str, &str)] = &[("(?i)^luxair.*", "Luxair")];

static ALIAS_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    CARRIER_ALIASES
        .iter()
        .filter_map(|(pattern, canonical)| Regex::new(pattern).ok().map(|re| (re, *canonical)))
        .collect()
});

static DASHED_FLIGHT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9]+)-(\d+)$").expect("valid flight number pattern"));

/// Rewrites `<code>-<digits>` into `<code><digits>` with leading zeros dropped.
///
/// Anything that does not match passes through unchanged.
pub fn normalize_flight_number(flight_number: &str) -> String {
    let Some(caps) = DASHED_FLIGHT_NUMBER.captures(flight_number) else {
        return flight_number.to_string();
    };

    match caps[2].parse::<u64>() {
        Ok(number) => format!("{}{}", &caps[1], number),
        Err(_) => flight_number.to_string(),
    }
}

/// Maps a marketing airline name onto its canonical short name.
pub fn canonicalize_airline_name(name: &str) -> String {
    ALIAS_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(name))
        .map_or_else(|| name.to_string(), |(_, canonical)| canonical.to_string())
}

/// Canonicalizes flight numbers and airline names of carrier API records.
pub fn normalize_carrier_records(records: Vec<FlightRecord>) -> Vec<FlightRecord> {
    records
        .into_iter()
        .map(|mut record| {
            record.flight_number = normalize_flight_number(&record.flight_number);
            record.airline_name = canonicalize_airline_name(&record.airline_name);
            record
        })
        .collect()
}

/// Drops airport board records operated by `excluded_iata`.
pub fn exclude_carrier(records: Vec<FlightRecord>, excluded_iata: &str) -> Vec<FlightRecord> {
    records
        .into_iter()
        .filter(|record| record.airline_iata != excluded_iata)
        .collect()
}
