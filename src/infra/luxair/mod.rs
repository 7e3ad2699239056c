mod client;

pub use client::{DEFAULT_BASE_URL, LuxairApi, parse_flights};
