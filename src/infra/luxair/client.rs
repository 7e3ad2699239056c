//! Client for the carrier's JSON flight API.
//!
//! `GET {base}/departures` answers `{"departures": [...]}` and
//! `GET {base}/arrivals` answers `{"arrivals": [...]}`. Elements already use
//! the record field names; they only lack the direction tag.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::fetch::{HttpClient, fetch_text};
use crate::flight::{Direction, FlightRecord};
use crate::services::FlightSource;

pub const DEFAULT_BASE_URL: &str = "https://api.luxair.lu/v2/flights";

pub struct LuxairApi<C> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> LuxairApi<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_direction(&self, direction: Direction) -> Result<Vec<FlightRecord>> {
        let url = format!("{}/{}", self.base_url, collection_key(direction));
        let body = fetch_text(&self.client, &url).await?;
        parse_flights(direction, &body)
    }
}

#[async_trait]
impl<C: HttpClient> FlightSource for LuxairApi<C> {
    fn name(&self) -> &str {
        "luxair"
    }

    async fn fetch_flights(&self) -> Result<Vec<FlightRecord>> {
        let (departures, arrivals) = tokio::try_join!(
            self.fetch_direction(Direction::Departure),
            self.fetch_direction(Direction::Arrival),
        )?;

        Ok(departures.into_iter().chain(arrivals).collect())
    }
}

fn collection_key(direction: Direction) -> &'static str {
    match direction {
        Direction::Departure => "departures",
        Direction::Arrival => "arrivals",
    }
}

fn time_fields(direction: Direction) -> (&'static str, &'static str) {
    match direction {
        Direction::Departure => ("scheduledDeparture", "estimatedDeparture"),
        Direction::Arrival => ("scheduledArrival", "estimatedArrival"),
    }
}

/// Parses one API response body into records of `direction`.
///
/// Elements that do not form a valid record are skipped with a warning. A
/// missing estimate falls back to the scheduled time.
pub fn parse_flights(direction: Direction, body: &str) -> Result<Vec<FlightRecord>> {
    let mut json: Value = serde_json::from_str(body).context("carrier API returned invalid JSON")?;
    let key = collection_key(direction);

    let items = match json.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        Some(Value::Null) => Vec::new(),
        _ => return Err(anyhow!("carrier API response has no `{key}` array")),
    };

    let (scheduled_field, estimated_field) = time_fields(direction);
    let mut records = Vec::with_capacity(items.len());

    for mut item in items {
        let Some(object) = item.as_object_mut() else {
            warn!(direction = %direction, "Skipping non-object flight entry");
            continue;
        };

        object.insert("type".to_string(), Value::String(direction.to_string()));

        let estimate_missing = object
            .get(estimated_field)
            .and_then(Value::as_str)
            .is_none_or(str::is_empty);
        if estimate_missing {
            if let Some(scheduled) = object.get(scheduled_field).cloned() {
                object.insert(estimated_field.to_string(), scheduled);
            }
        }

        match serde_json::from_value::<FlightRecord>(item) {
            Ok(record) => records.push(record),
            Err(e) => warn!(direction = %direction, error = %e, "Skipping malformed flight entry"),
        }
    }

    Ok(records)
}
