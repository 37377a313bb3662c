//! RelaySettings - config loader output
//!
//! The immutable settings snapshot handed to each rebuilt sink set.
//! Configuration changes produce a new snapshot rather than mutating
//! fields in place.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SettingsVersion {
    #[default]
    V1,
}

/// Complete relay settings snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Settings version
    #[serde(default)]
    pub version: SettingsVersion,

    /// Source / supervisor settings
    #[serde(default)]
    pub source: SourceSettings,

    /// CSV log sink settings
    #[serde(default)]
    pub log: LogSettings,

    /// IBI export sink settings
    #[serde(default)]
    pub ibi: IbiSettings,

    /// Raw BPM file sink settings
    #[serde(default)]
    pub bpm: BpmSettings,

    /// UDP broadcast sink settings
    #[serde(default)]
    pub udp: UdpSettings,
}

/// Source supervision settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Seconds of silence before the watchdog considers the link stale
    #[serde(default = "default_disconnected_timeout_secs")]
    pub disconnected_timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            disconnected_timeout_secs: default_disconnected_timeout_secs(),
        }
    }
}

impl SourceSettings {
    /// Staleness timeout as a duration
    pub fn disconnected_timeout(&self) -> Duration {
        Duration::from_secs(self.disconnected_timeout_secs)
    }
}

fn default_disconnected_timeout_secs() -> u64 {
    10
}

/// CSV log sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// Target file path, may contain `%date[:format]%` tokens.
    /// Blank disables the sink.
    #[serde(default)]
    pub file: String,

    /// Record format selector; only "csv" is recognized, anything else
    /// produces no rows
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Date format for the CSV timestamp column; empty uses the default
    /// rendering, "OA" renders a serial day number
    #[serde(default)]
    pub date_format: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: String::new(),
            format: default_log_format(),
            date_format: String::new(),
        }
    }
}

fn default_log_format() -> String {
    "csv".to_string()
}

/// IBI export sink settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IbiSettings {
    /// Target file path; blank disables the sink
    #[serde(default)]
    pub file: String,
}

/// Raw BPM file sink settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BpmSettings {
    /// Target file path; blank disables the sink
    #[serde(default)]
    pub file: String,
}

/// UDP broadcast sink settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UdpSettings {
    /// Destination hostname; blank disables the sink
    #[serde(default)]
    pub hostname: String,

    /// Destination port; zero disables the sink
    #[serde(default)]
    pub port: u16,
}

impl UdpSettings {
    /// Whether the endpoint is configured well enough to attempt a socket
    pub fn is_valid(&self) -> bool {
        !self.hostname.trim().is_empty() && self.port != 0
    }

    /// Endpoint in `host:port` form, if valid
    pub fn endpoint(&self) -> Option<String> {
        self.is_valid()
            .then(|| format!("{}:{}", self.hostname.trim(), self.port))
    }
}

/// Interpret a configured file target: blank or whitespace means disabled.
pub fn sink_target(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
