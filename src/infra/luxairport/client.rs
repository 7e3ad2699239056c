use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::scrape::parse_board;
use crate::fetch::{HttpClient, fetch_text};
use crate::flight::{Direction, FlightRecord};
use crate::services::FlightSource;

pub const DEFAULT_DEPARTURES_URL: &str =
    "http://www.lux-airport.lu/en/Flights-information/Todays-departure.9.html";
pub const DEFAULT_ARRIVALS_URL: &str =
    "http://www.lux-airport.lu/en/Flights-information/Todays-arrivals.10.html";

/// Scrapes today's departure and arrival boards.
pub struct AirportBoard<C> {
    client: C,
    departures_url: String,
    arrivals_url: String,
}

impl<C: HttpClient> AirportBoard<C> {
    pub fn new(client: C, departures_url: impl Into<String>, arrivals_url: impl Into<String>) -> Self {
        Self {
            client,
            departures_url: departures_url.into(),
            arrivals_url: arrivals_url.into(),
        }
    }

    #[tracing::instrument(skip(self, url), fields(url = %url))]
    async fn fetch_board(&self, url: &str, direction: Direction) -> Result<Vec<FlightRecord>> {
        let html = fetch_text(&self.client, url).await?;
        let records = parse_board(&html, direction);
        debug!(flights = records.len(), "Board scraped");
        Ok(records)
    }
}

#[async_trait]
impl<C: HttpClient> FlightSource for AirportBoard<C> {
    fn name(&self) -> &str {
        "lux-airport"
    }

    async fn fetch_flights(&self) -> Result<Vec<FlightRecord>> {
        let (departures, arrivals) = tokio::try_join!(
            self.fetch_board(&self.departures_url, Direction::Departure),
            self.fetch_board(&self.arrivals_url, Direction::Arrival),
        )?;

        Ok(departures.into_iter().chain(arrivals).collect())
    }
}
