//! CLI entry point for the flight status notifier.
//!
//! `run` polls the carrier API and the airport boards and announces delays,
//! early legs and cancellations. `replay` reconciles two saved snapshots
//! offline and logs what would have been announced.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use flight_notifier::config::{AppConfig, BEARER_TOKEN_VAR, Environment};
use flight_notifier::fetch::BasicClient;
use flight_notifier::flight::Snapshot;
use flight_notifier::infra::luxair::LuxairApi;
use flight_notifier::infra::luxairport::AirportBoard;
use flight_notifier::infra::twitter::StatusApi;
use flight_notifier::pipeline::reconcile;
use flight_notifier::poller::{Poller, PollerSettings};
use flight_notifier::services::{EchoNotifier, Notifier};
use flight_notifier::snapshot::load_snapshot;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "flight_notifier")]
#[command(about = "Announces flight delays, early legs and cancellations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll both sources and deliver notifications
    Run {
        /// JSON config file
        #[arg(short, long, default_value = "data/config.json")]
        config: PathBuf,

        /// Snapshot file, overrides the config
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Seconds between polls, overrides the config
        #[arg(short = 'r', long)]
        interval_secs: Option<u64>,

        /// Deliver for real instead of echoing (also APP_ENV=production)
        #[arg(long, default_value_t = false)]
        production: bool,

        /// Number of poll cycles to run (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        cycles: usize,
    },
    /// Reconcile two snapshot files and log the resulting notifications
    Replay {
        /// Snapshot of the earlier poll
        #[arg(value_name = "PREVIOUS")]
        previous: PathBuf,

        /// Snapshot of the later poll
        #[arg(value_name = "CURRENT")]
        current: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _log_guard = init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            state,
            interval_secs,
            production,
            cycles,
        } => {
            let mut config = AppConfig::load(&config)?.with_env_overrides();
            if let Some(state) = state {
                config.state_path = state;
            }
            if let Some(secs) = interval_secs {
                config.fetch_interval = secs.saturating_mul(1000);
            }

            let environment = if production {
                Environment::Production
            } else {
                Environment::from_env()
            };

            if environment.is_production() {
                let token = config
                    .delivery
                    .bearer_token
                    .clone()
                    .ok_or_else(|| anyhow!("{BEARER_TOKEN_VAR} must be set in production"))?;
                let notifier = StatusApi::new(BasicClient::new()?, &config.delivery.endpoint, &token)?;
                run_poller(&config, notifier, cycles).await?;
            } else {
                info!("Not in production, notifications are echoed only");
                run_poller(&config, EchoNotifier, cycles).await?;
            }
        }
        Commands::Replay { previous, current } => {
            let previous = read_snapshot(&previous)?;
            let current = read_snapshot(&current)?;

            let notifications = reconcile(&previous, &current)?;
            info!(count = notifications.len(), "Replay complete");

            for notification in &notifications {
                info!("{}", serde_json::to_string_pretty(notification)?);
            }
        }
    }

    Ok(())
}

/// Installs the stderr layer and the daily JSON log file under
/// `LOG_FILE_PATH`.
///
/// The returned guard flushes the file writer when dropped, so it must live
/// as long as `main`.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/flight_notifier.log".to_string());
    let log_file_path = Path::new(&log_file_path);
    let log_dir = log_file_path.parent().unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("flight_notifier.log"));

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, log_file_name));

    let console = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_file = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(console)
        .with(json_file)
        .init();

    Ok(guard)
}

/// Builds both sources and polls until the loop ends.
#[tracing::instrument(skip(config, notifier), fields(state = %config.state_path.display()))]
async fn run_poller<N: Notifier>(config: &AppConfig, notifier: N, cycles: usize) -> Result<()> {
    let carrier = LuxairApi::new(BasicClient::new()?, &config.luxair_base_url);
    let airport = AirportBoard::new(
        BasicClient::new()?,
        &config.departures_board_url,
        &config.arrivals_board_url,
    );

    let settings = PollerSettings {
        interval: config.interval(),
        excluded_carrier: config.excluded_carrier.clone(),
        state_path: Some(config.state_path.clone()),
    };
    let initial = load_snapshot(&config.state_path);

    Poller::new(carrier, airport, notifier, settings, initial)
        .run(cycles)
        .await
}

/// Reads a snapshot file, failing on missing or malformed content.
fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}
