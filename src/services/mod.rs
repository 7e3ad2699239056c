//! Seams between the reconciliation core and the outside world.

pub mod flight_source;
pub mod notifier;

pub use flight_source::FlightSource;
pub use notifier::{EchoNotifier, Notifier, PostedStatus};
