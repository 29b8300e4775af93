mod clock;
mod config;
mod framer;
mod logger;
mod ports;
mod sink;
mod stream;
mod watchdog;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{MonitorConfig, DEFAULT_BAUD_RATE, DEFAULT_POLL_INTERVAL};
use crate::logger::Logger;
use crate::ports::SystemSerial;
use crate::sink::AppendSink;
use crate::watchdog::Watchdog;

/// Wait for a serial device to appear, stream its line-oriented output to
/// the console (and an optional append-only log file) with per-line
/// timestamps, and keep watching across unplug/replug cycles.
#[derive(Parser, Debug)]
#[command(name = "portwatch", version, about)]
struct Cli {
    /// Serial device path to watch for (matched case-insensitively)
    #[arg(value_name = "PORT", default_value_t = config::default_port())]
    port: String,

    /// Baud rate used when opening the device
    #[arg(value_name = "BAUD_RATE", default_value_t = DEFAULT_BAUD_RATE)]
    baud_rate: u32,

    /// Append-only log file; created if missing
    #[arg(value_name = "LOG_FILE")]
    log_file: Option<PathBuf>,
}

/// Errors that can abort startup before the watchdog loop begins.
#[derive(Debug)]
enum StartupError {
    /// The log file could not be resolved or opened for appending.
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::LogFile { path, source } => {
                write!(f, "failed to open log file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::LogFile { source, .. } => Some(source),
        }
    }
}

fn resolve_log_file(path: &PathBuf) -> Result<PathBuf, StartupError> {
    std::path::absolute(path).map_err(|e| StartupError::LogFile {
        path: path.clone(),
        source: e,
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr and stay off unless RUST_LOG asks for them;
    // stdout carries only the monitor's scraper-facing output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::OFF.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    tracing::debug!(?cli, "parsed arguments");

    let log_file = match &cli.log_file {
        Some(path) => Some(resolve_log_file(path)?),
        None => None,
    };

    let config = MonitorConfig {
        port: cli.port,
        baud_rate: cli.baud_rate,
        log_file,
        poll_interval: DEFAULT_POLL_INTERVAL,
    };

    let sink = match &config.log_file {
        Some(path) => {
            let sink = AppendSink::open(path).map_err(|e| StartupError::LogFile {
                path: path.clone(),
                source: e,
            })?;
            println!("Logging output to file: {}", sink.path().display());
            Some(sink)
        }
        None => None,
    };

    Watchdog::new(config, SystemSerial, Logger::new(sink))
        .run()
        .await;
    Ok(())
}
