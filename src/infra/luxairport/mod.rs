//! The airport's own departure and arrival boards, published as HTML.

mod client;
mod scrape;

pub use client::{AirportBoard, DEFAULT_ARRIVALS_URL, DEFAULT_DEPARTURES_URL};
pub use scrape::{extract_rows, parse_board, row_to_record, status_for};
