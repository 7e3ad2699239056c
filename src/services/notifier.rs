//! Delivery of notification text.

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// What the delivery endpoint reports back for a posted status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedStatus {
    pub created_at: String,
    pub text: String,
    pub id_str: String,
}

/// Abstraction over a status-posting endpoint.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, status: &str) -> Result<PostedStatus>;
}

/// Stand-in for non-production runs: echoes the status without any network
/// call and reports id `0`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoNotifier;

#[async_trait::async_trait]
impl Notifier for EchoNotifier {
    async fn post(&self, status: &str) -> Result<PostedStatus> {
        Ok(PostedStatus {
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            text: status.to_string(),
            id_str: "0".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_returns_status_with_zero_id() {
        let posted = EchoNotifier.post("Luxair flight #LG4711 has been cancelled.").await.unwrap();

        assert_eq!(posted.text, "Luxair flight #LG4711 has been cancelled.");
        assert_eq!(posted.id_str, "0");
        assert!(posted.created_at.ends_with('Z'));
    }
}
