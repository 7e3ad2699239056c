//! Timer-driven poll loop.
//!
//! One task owns the last snapshot. Every tick fetches both sources
//! concurrently, normalizes and merges them, persists the merged snapshot in
//! the background, reconciles it against the previous one and delivers the
//! resulting notifications. Cycles never overlap: the next tick is only
//! awaited once the current cycle has finished.

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::flight::Snapshot;
use crate::merge::merge_snapshots;
use crate::normalize::{exclude_carrier, normalize_carrier_records};
use crate::pipeline::Reconciler;
use crate::render::Notification;
use crate::services::{FlightSource, Notifier};
use crate::snapshot::save_snapshot;

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub interval: Duration,
    /// Airline code dropped from the airport source.
    pub excluded_carrier: String,
    /// Where each new snapshot is persisted; `None` disables persistence.
    pub state_path: Option<PathBuf>,
}

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: bool,
    pub flights: usize,
    pub notifications: usize,
    pub delivered: usize,
}

pub struct Poller<A, B, N> {
    carrier: A,
    airport: B,
    notifier: N,
    settings: PollerSettings,
    reconciler: Reconciler,
    /// Latest background write; each new write waits for it first.
    pending_write: Option<JoinHandle<()>>,
}

impl<A, B, N> Poller<A, B, N>
where
    A: FlightSource,
    B: FlightSource,
    N: Notifier,
{
    /// `initial` is the persisted snapshot the first cycle is diffed against.
    pub fn new(carrier: A, airport: B, notifier: N, settings: PollerSettings, initial: Snapshot) -> Self {
        Self {
            carrier,
            airport,
            notifier,
            settings,
            reconciler: Reconciler::new(initial),
            pending_write: None,
        }
    }

    pub fn last_snapshot(&self) -> &Snapshot {
        self.reconciler.last()
    }

    /// Fetches both sources concurrently and merges them into one snapshot.
    ///
    /// Fails when either source fails.
    pub async fn poll_snapshot(&self) -> Result<Snapshot> {
        let (carrier, airport) = tokio::try_join!(
            self.carrier.fetch_flights(),
            self.airport.fetch_flights(),
        )?;
        debug!(
            carrier_source = self.carrier.name(),
            carrier_flights = carrier.len(),
            airport_source = self.airport.name(),
            airport_flights = airport.len(),
            "Sources fetched"
        );

        Ok(merge_snapshots(
            normalize_carrier_records(carrier),
            exclude_carrier(airport, &self.settings.excluded_carrier),
        ))
    }

    /// Runs one cycle.
    ///
    /// Fetch, persistence and delivery failures are logged and leave the
    /// loop running; a fetch failure leaves the previous snapshot in place.
    ///
    /// # Errors
    ///
    /// Returns an error only when reconciliation fails, which ends the loop.
    #[tracing::instrument(skip(self))]
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let snapshot = match self.poll_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %format!("{e:#}"), "Fetch failed, skipping cycle");
                return Ok(CycleReport::default());
            }
        };

        self.persist(&snapshot);

        let flights = snapshot.len();
        let notifications = self.reconciler.advance(snapshot)?;
        let delivered = self.deliver(&notifications).await;

        let report = CycleReport {
            fetched: true,
            flights,
            notifications: notifications.len(),
            delivered,
        };
        info!(
            flights = report.flights,
            notifications = report.notifications,
            delivered = report.delivered,
            "Cycle complete"
        );
        Ok(report)
    }

    /// Polls every interval, starting immediately.
    ///
    /// `max_cycles` of `0` means run until an error ends the loop.
    pub async fn run(mut self, max_cycles: usize) -> Result<()> {
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_ms = self.settings.interval.as_millis() as u64,
            previous_flights = self.reconciler.last().len(),
            "Polling started"
        );

        let mut cycles = 0;
        while max_cycles == 0 || cycles < max_cycles {
            ticker.tick().await;
            cycles += 1;
            self.run_cycle().await?;
        }

        self.flush().await;
        info!(cycles, "Polling finished");
        Ok(())
    }

    /// Saves `snapshot` in the background without holding up the cycle.
    ///
    /// Writes are chained so they land on disk in cycle order.
    fn persist(&mut self, snapshot: &Snapshot) {
        let Some(path) = self.settings.state_path.clone() else {
            return;
        };
        let snapshot = snapshot.clone();
        let previous = self.pending_write.take();

        self.pending_write = Some(tokio::spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            let written = tokio::task::spawn_blocking(move || {
                if let Err(e) = save_snapshot(&path, &snapshot) {
                    error!(path = %path.display(), error = %format!("{e:#}"), "Error writing state to disk");
                }
            })
            .await;
            if let Err(e) = written {
                error!(error = %e, "State writer task failed");
            }
        }));
    }

    /// Waits for the latest background write to finish.
    pub async fn flush(&mut self) {
        if let Some(pending) = self.pending_write.take() {
            if let Err(e) = pending.await {
                error!(error = %e, "State writer task failed");
            }
        }
    }

    async fn deliver(&self, notifications: &[Notification]) -> usize {
        let mut delivered = 0;

        for notification in notifications {
            match self.notifier.post(&notification.tweet).await {
                Ok(posted) => {
                    delivered += 1;
                    info!(
                        created_at = %posted.created_at,
                        text = %posted.text,
                        id_str = %posted.id_str,
                        "tweeted"
                    );
                }
                Err(e) => warn!(
                    flight_number = %notification.flight().flight_number,
                    error = %format!("{e:#}"),
                    "Delivery failed"
                ),
            }
        }

        delivered
    }
}
