//! BpmFileSink - raw beats-per-minute value export

use std::path::PathBuf;

use chrono::NaiveDateTime;
use contracts::{sink_target, ContractError, Reading, ReadingSink, RelaySettings};

use crate::sinks::overwrite;
use crate::timefmt;

/// Sink that replaces its target file with the current BPM as decimal text
/// on every non-error reading, for stream overlays and similar pollers.
pub struct BpmFileSink {
    filename: Option<PathBuf>,
}

impl BpmFileSink {
    /// Create from a settings snapshot
    pub fn from_settings(settings: &RelaySettings, started_at: NaiveDateTime) -> Self {
        let filename = sink_target(&settings.bpm.file).map(|target| {
            PathBuf::from(timefmt::format_string_tokens(
                target,
                started_at,
                timefmt::DEFAULT_FILENAME_FORMAT,
                true,
            ))
        });

        Self { filename }
    }

    /// Create with an explicit target (tests)
    pub fn new(filename: Option<PathBuf>) -> Self {
        Self { filename }
    }
}

impl ReadingSink for BpmFileSink {
    fn name(&self) -> &str {
        "bpm"
    }

    fn reading(&self, reading: &Reading) -> Result<(), ContractError> {
        let Some(path) = &self.filename else {
            return Ok(());
        };
        if reading.is_error {
            return Ok(());
        }

        overwrite(path, &reading.beats_per_minute.to_string())
            .map_err(|e| ContractError::sink_write(self.name(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn overwrites_instead_of_appending() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bpm.txt");
        let sink = BpmFileSink::new(Some(path.clone()));

        let mut reading = Reading::default();
        reading.beats_per_minute = 72;
        sink.reading(&reading).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "72");

        reading.beats_per_minute = 105;
        sink.reading(&reading).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "105");
    }

    #[test]
    fn error_reading_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bpm.txt");
        let sink = BpmFileSink::new(Some(path.clone()));

        let mut reading = Reading::default();
        reading.beats_per_minute = 72;
        sink.reading(&reading).unwrap();
        sink.reading(&Reading::error("gone")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "72");
    }

    #[test]
    fn unset_target_is_noop() {
        let sink = BpmFileSink::new(None);
        assert!(sink.reading(&Reading::default()).is_ok());
    }
}
