//! One reconciliation cycle: previous and current snapshot in, validated
//! notifications out.

use anyhow::Result;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::diff::find_changes;
use crate::flight::{FlightRecord, Snapshot};
use crate::render::{Notification, render};
use crate::validate::validate;

/// Diffs, classifies, renders and validates the legs of `current`.
///
/// Legs that have already landed or taken off and legs running as scheduled
/// produce nothing. Notifications failing validation are logged and dropped.
///
/// # Errors
///
/// Returns an error when an event cannot be rendered, which means the
/// classification itself is broken.
pub fn reconcile(previous: &[FlightRecord], current: &[FlightRecord]) -> Result<Vec<Notification>> {
    let diffed = find_changes(previous, current)?;
    debug!(current = current.len(), changed = diffed.len(), "Snapshots diffed");

    let mut notifications = Vec::new();

    for event in diffed
        .into_iter()
        .filter(|flight| !flight.flight.is_completed())
        .map(classify)
        .filter(|event| event.status_type.is_reportable())
    {
        let notification = render(event)?;

        match validate(&notification) {
            Ok(()) => notifications.push(notification),
            Err(e) => warn!(
                flight_number = %notification.flight().flight_number,
                status_type = %notification.event.status_type,
                tweet = %notification.tweet,
                error = %e,
                "Dropping invalid notification"
            ),
        }
    }

    Ok(notifications)
}

/// Holds the last snapshot and pairs every new one with it.
#[derive(Debug, Default)]
pub struct Reconciler {
    last: Snapshot,
}

impl Reconciler {
    pub fn new(initial: Snapshot) -> Self {
        Self { last: initial }
    }

    pub fn last(&self) -> &Snapshot {
        &self.last
    }

    /// Reconciles `current` against the last snapshot, then makes it the last.
    pub fn advance(&mut self, current: Snapshot) -> Result<Vec<Notification>> {
        let notifications = reconcile(&self.last, &current)?;
        self.last = current;
        Ok(notifications)
    }
}
