//! Trait for upstream flight-status providers.

use anyhow::Result;

use crate::flight::FlightRecord;

/// A provider of flight records for both directions of the monitored airport.
#[async_trait::async_trait]
pub trait FlightSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetches the current arrivals and departures, each tagged with its
    /// direction.
    async fn fetch_flights(&self) -> Result<Vec<FlightRecord>>;
}
