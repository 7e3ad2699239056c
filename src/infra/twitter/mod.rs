mod client;

pub use client::{DEFAULT_ENDPOINT, StatusApi, parse_posted_status};
