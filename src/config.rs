use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// How often the watchdog compares the target against the port snapshot.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Resolved monitor settings, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Device path to watch for, matched case-insensitively against the
    /// enumeration snapshot.
    pub port: String,
    pub baud_rate: u32,
    /// Absolute path of the append-only log file, when configured.
    pub log_file: Option<PathBuf>,
    pub poll_interval: Duration,
}

/// Placeholder device name used when no port argument is given.
pub fn default_port() -> String {
    if cfg!(windows) {
        "COM18".to_string()
    } else {
        "/dev/ttyUSB0".to_string()
    }
}
