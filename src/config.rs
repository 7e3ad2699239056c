//! Service configuration.
//!
//! Stored as a camelCase JSON object on disk; every field is optional:
//! ```json
//! {
//!   "fetchInterval": 60000,
//!   "statePath": "data/state.json",
//!   "excludedCarrier": "LG",
//!   "delivery": { "endpoint": "https://api.twitter.com/2/tweets", "bearerToken": "..." }
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::infra::{luxair, luxairport, twitter};

pub const BEARER_TOKEN_VAR: &str = "DELIVERY_BEARER_TOKEN";
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryConfig {
    pub endpoint: String,
    pub bearer_token: Option<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: twitter::DEFAULT_ENDPOINT.to_string(),
            bearer_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Milliseconds between poll cycle starts.
    pub fetch_interval: u64,
    pub state_path: PathBuf,
    /// Airline code dropped from the airport boards.
    pub excluded_carrier: String,
    pub luxair_base_url: String,
    pub departures_board_url: String,
    pub arrivals_board_url: String,
    pub delivery: DeliveryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch_interval: 60_000,
            state_path: PathBuf::from("data/state.json"),
            excluded_carrier: "LG".to_string(),
            luxair_base_url: luxair::DEFAULT_BASE_URL.to_string(),
            departures_board_url: luxairport::DEFAULT_DEPARTURES_URL.to_string(),
            arrivals_board_url: luxairport::DEFAULT_ARRIVALS_URL.to_string(),
            delivery: DeliveryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from a JSON file at `path`; a missing file means
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var(BEARER_TOKEN_VAR) {
            if !token.is_empty() {
                self.delivery.bearer_token = Some(token);
            }
        }
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.fetch_interval.max(1))
    }
}

/// Whether notifications are really delivered or only echoed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    pub fn from_flag(production: bool) -> Self {
        if production {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    /// `APP_ENV=production` selects production; anything else does not.
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(ENVIRONMENT_VAR).is_ok_and(|v| v == "production"))
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}
