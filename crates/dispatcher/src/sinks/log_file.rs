//! LogFileSink - appends CSV rows to the log file

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use contracts::{sink_target, ContractError, Reading, ReadingSink, RelaySettings};
use tracing::debug;

use crate::csv::csv_row;
use crate::sinks::append_line;
use crate::timefmt;

/// Sink that appends one CSV row per non-error reading.
///
/// No-op when the target is blank or the record format is unrecognized.
pub struct LogFileSink {
    filename: Option<PathBuf>,
    format: String,
    date_format: String,
}

impl LogFileSink {
    /// Create from a settings snapshot, resolving `%date%` tokens in the
    /// target against the process start time.
    pub fn from_settings(settings: &RelaySettings, started_at: NaiveDateTime) -> Self {
        let filename = sink_target(&settings.log.file).map(|target| {
            PathBuf::from(timefmt::format_string_tokens(
                target,
                started_at,
                timefmt::DEFAULT_FILENAME_FORMAT,
                true,
            ))
        });

        if let Some(path) = &filename {
            debug!(path = %path.display(), "log sink target resolved");
        }

        Self {
            filename,
            format: settings.log.format.clone(),
            date_format: settings.log.date_format.clone(),
        }
    }

    /// Create with an explicit target (tests)
    pub fn new(filename: Option<PathBuf>, format: &str, date_format: &str) -> Self {
        Self {
            filename,
            format: format.to_string(),
            date_format: date_format.to_string(),
        }
    }

    /// Resolved target path, if the sink is active
    pub fn target(&self) -> Option<&PathBuf> {
        self.filename.as_ref()
    }
}

impl ReadingSink for LogFileSink {
    fn name(&self) -> &str {
        "log"
    }

    fn reading(&self, reading: &Reading) -> Result<(), ContractError> {
        let Some(path) = &self.filename else {
            return Ok(());
        };

        let now = Local::now().naive_local();
        let Some(row) = csv_row(&self.format, &self.date_format, reading, now) else {
            return Ok(());
        };

        append_line(path, &row).map_err(|e| ContractError::sink_write(self.name(), e.to_string()))
    }
}
