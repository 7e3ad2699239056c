//! Extraction of flight rows from the airport's HTML boards.
//!
//! Flights are the rows of the `table.fly` element, header row first. Cells
//! are read by position:
//!
//! | Column | Content |
//! |--------|---------|
//! | 0 | counterpart airport name |
//! | 1 | flight number (first two characters are the airline code) |
//! | 2 | via airport name, may be empty |
//! | 3 | scheduled time |
//! | 4 | status text |
//! | 5 | estimated time, empty when unchanged |
//! | 6 | aircraft type |
//! | 7 | airline name |

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::flight::{Airport, Direction, FlightRecord, Leg};

const MIN_COLUMNS: usize = 8;

static FLY_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<table\b[^>]*\bclass\s*=\s*["'][^"']*\bfly\b[^"']*["'][^>]*>(.*?)</table>"#)
        .expect("valid table pattern")
});
static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("valid row pattern"));
static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td>").expect("valid cell pattern"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Board status text → (flight status, status code).
static STATUS_MAPPING: &[(&str, (&str, &str))] = &[
    ("Take Off", ("Departed", "DEP")),
    ("Arrived", ("Landed", "ARR")),
    ("Landing", ("Estimated", "EXP")),
    ("Taxiing", ("Departed", "DEP")),
    ("Expected", ("Estimated", "EXP")),
    ("Delayed", ("Estimated", "EXP")),
    ("Cancelled", ("Cancelled", "CNX")),
    ("", ("Expected", "PLN")),
];
const UNKNOWN_STATUS: (&str, &str) = ("Unknown", "UKN");

/// Maps board status text onto a flight status and its short code.
pub fn status_for(text: &str) -> (&'static str, &'static str) {
    STATUS_MAPPING
        .iter()
        .find(|(board_text, _)| *board_text == text)
        .map_or(UNKNOWN_STATUS, |(_, status)| *status)
}

/// Text content of every data row of the flights table.
pub fn extract_rows(html: &str) -> Vec<Vec<String>> {
    let Some(table) = FLY_TABLE.captures(html) else {
        return Vec::new();
    };

    ROW.captures_iter(&table[1])
        .skip(1)
        .map(|row| {
            CELL.captures_iter(&row[1])
                .map(|cell| text_content(&cell[1]))
                .collect()
        })
        .collect()
}

fn text_content(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, " ");
    let decoded = html_escape::decode_html_entities(&stripped);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

fn non_empty(text: &str) -> Option<&str> {
    Some(text).filter(|t| !t.is_empty())
}

/// Builds a record from one board row, or `None` when the row is too short.
pub fn row_to_record(cells: &[String], direction: Direction) -> Option<FlightRecord> {
    if cells.len() < MIN_COLUMNS {
        return None;
    }

    let counterpart = Airport::new(None, &cells[0]);
    let scheduled = cells[3].clone();
    let estimated = non_empty(&cells[5]).unwrap_or(cells[3].as_str()).to_string();

    let leg = match direction {
        Direction::Departure => Leg::Departure {
            scheduled_departure: scheduled,
            estimated_departure: estimated,
            arrival_airport: counterpart,
        },
        Direction::Arrival => Leg::Arrival {
            scheduled_arrival: scheduled,
            estimated_arrival: estimated,
            departure_airport: counterpart,
        },
    };
    let (flight_status, flight_status_code) = status_for(&cells[4]);

    Some(FlightRecord {
        leg,
        flight_number: cells[1].clone(),
        airline_name: cells[7].clone(),
        airline_iata: cells[1].chars().take(2).collect(),
        flight_status: flight_status.to_string(),
        flight_status_code: flight_status_code.to_string(),
        via_airport: non_empty(&cells[2]).map(|name| Airport::new(None, name)),
        gate: None,
        terminal: None,
        aircraft_type: non_empty(&cells[6]).map(str::to_string),
    })
}

/// Parses a whole board page into records of `direction`.
pub fn parse_board(html: &str, direction: Direction) -> Vec<FlightRecord> {
    let rows = extract_rows(html);
    let total = rows.len();

    let records: Vec<_> = rows
        .iter()
        .filter_map(|cells| row_to_record(cells, direction))
        .collect();

    if records.len() < total {
        debug!(direction = %direction, skipped = total - records.len(), "Skipped short board rows");
    }
    records
}
