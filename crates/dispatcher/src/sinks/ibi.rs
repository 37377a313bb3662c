//! IbiSink - inter-beat-interval export

use std::path::PathBuf;

use chrono::NaiveDateTime;
use contracts::{sink_target, ContractError, Reading, ReadingSink, RelaySettings};

use crate::sinks::append_line;
use crate::timefmt;

/// Sink that appends one millisecond interval per line for each reading
/// carrying RR intervals.
///
/// No-op for error readings, readings without intervals, or a blank target.
pub struct IbiSink {
    filename: Option<PathBuf>,
}

impl IbiSink {
    /// Create from a settings snapshot
    pub fn from_settings(settings: &RelaySettings, started_at: NaiveDateTime) -> Self {
        let filename = sink_target(&settings.ibi.file).map(|target| {
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

/// Convert device RR intervals to IBI milliseconds.
///
/// Intervals arrive in 1/1024-second units; the export rounds each one to
/// whole seconds (half away from zero) and scales to milliseconds, matching
/// the files the original monitor produced.
pub fn as_milliseconds(rr_intervals: &[u16]) -> Vec<u64> {
    rr_intervals
        .iter()
        .map(|&v| (v as f64 / 1024.0).round() as u64 * 1000)
        .collect()
}

impl ReadingSink for IbiSink {
    fn name(&self) -> &str {
        "ibi"
    }

    fn reading(&self, reading: &Reading) -> Result<(), ContractError> {
        let Some(path) = &self.filename else {
            return Ok(());
        };
        if reading.is_error || reading.rr_intervals.is_empty() {
            return Ok(());
        }

        let lines = as_milliseconds(&reading.rr_intervals)
            .iter()
            .map(|ms| ms.to_string())
            .collect::<Vec<_>>()
            .join("\r\n");

        append_line(path, &lines).map_err(|e| ContractError::sink_write(self.name(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn converts_to_milliseconds_with_pinned_rounding() {
        assert_eq!(as_milliseconds(&[4 * 1024]), vec![4000]);
        // Rounding boundary: 4612/1024 is 4.504, which rounds up.
        assert_eq!(as_milliseconds(&[4 * 1024 + 516]), vec![5000]);
        assert_eq!(
            as_milliseconds(&[4 * 1024, 4 * 1024 + 516, 6 * 1024 + 4]),
            vec![4000, 5000, 6000]
        );
    }

    #[test]
    fn appends_one_interval_per_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.ibi");
        let sink = IbiSink::new(Some(path.clone()));

        let mut reading = Reading::default();
        reading.rr_intervals = vec![4 * 1024, 4 * 1024 + 516, 6 * 1024 + 4];
        sink.reading(&reading).unwrap();

        reading.rr_intervals = vec![7 * 1024, 8 * 1024, 9 * 1024];
        sink.reading(&reading).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec!["4000", "5000", "6000", "7000", "8000", "9000"]);
    }

    #[test]
    fn empty_intervals_write_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.ibi");
        let sink = IbiSink::new(Some(path.clone()));

        sink.reading(&Reading::default()).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn error_reading_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.ibi");
        let sink = IbiSink::new(Some(path.clone()));

        let mut reading = Reading::error("gone");
        reading.rr_intervals = vec![1024];
        sink.reading(&reading).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn unset_target_is_noop() {
        let sink = IbiSink::new(None);
        let mut reading = Reading::default();
        reading.rr_intervals = vec![1024];
        assert!(sink.reading(&reading).is_ok());
    }
}
