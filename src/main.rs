//! # CRSF Link
//!
//! Bridges a flight controller's CRSF serial port to a host process.
//!
//! - Telemetry from the flight controller is printed to stdout as JSON lines
//! - JSON control lines read from stdin set the RC channels
//! - RC channel frames go out on every control line and at the configured rate
//!
//! Logs go to stderr so stdout carries nothing but telemetry.
//!
//! # Usage
//!
//! ```bash
//! crsf-link [CONFIG_PATH]
//! ```
//!
//! The config path falls back to `$CRSF_LINK_CONFIG`, then
//! `config/default.toml`. A missing file means built-in defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crsf_link::config::Config;
use crsf_link::control::channels::ChannelState;
use crsf_link::link::{run_inbound, run_outbound};
use crsf_link::serial::CrsfSerial;
use crsf_link::telemetry::JsonLineSink;

/// Environment variable naming the config file
const CONFIG_ENV_VAR: &str = "CRSF_LINK_CONFIG";

/// Config file used when neither argument nor environment names one
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// How long shutdown waits for the blocking stdin reader
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let (log_writer, _log_guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(log_writer)
        .init();

    info!("CRSF Link v{} starting...", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let outcome = runtime.block_on(run());

    // Stdin reads park a blocking thread that never wakes without input
    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);

    outcome
}

async fn run() -> Result<()> {
    let path = config_path(std::env::args().nth(1), std::env::var(CONFIG_ENV_VAR).ok());
    let config = Config::load_or_default(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    info!("Loaded configuration from {}", path.display());

    let mut serial = CrsfSerial::open(&config.serial)?;
    info!("Serial port opened at: {}", serial.device_path());

    let mut state = ChannelState::new(config.channels.range());
    let mut sink = JsonLineSink::new(std::io::stdout());
    let control = BufReader::new(tokio::io::stdin());
    let period = config.crsf.packet_interval();

    info!("Press Ctrl+C to exit");

    let outcome = {
        let (mut reader, mut writer) = serial.split();

        tokio::select! {
            result = run_inbound(&mut reader, &mut sink) => {
                result.context("Telemetry link stopped")
            }
            result = run_outbound(control, &mut writer, &mut state, period) => {
                result.context("Control link stopped")
            }
            result = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                result.context("Failed to listen for Ctrl+C")
            }
        }
    };

    serial.close().await;
    outcome
}

/// Config file to load: CLI argument, then environment, then the default
fn config_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
        .into()
}
