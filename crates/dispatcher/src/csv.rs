//! CSV row construction
//!
//! Shared by the log file sink and the UDP sink. The quoting rule is the
//! original monitor's, not RFC 4180: values are quoted only when they
//! contain a comma or newline (the RR field is always quoted), and embedded
//! quotes are escaped with a backslash rather than doubled. Downstream
//! consumers parse this exact dialect.

use chrono::NaiveDateTime;
use contracts::Reading;

use crate::timefmt;

/// Render one reading as a CSV row, without a line terminator.
///
/// Columns: timestamp, BPM, contact status, energy expended (empty when
/// absent), RR intervals (comma-joined, always quoted). Returns `None` for
/// error readings and for unrecognized record formats; only "csv" is
/// recognized.
pub fn csv_row(
    format: &str,
    date_format: &str,
    reading: &Reading,
    now: NaiveDateTime,
) -> Option<String> {
    if reading.is_error {
        return None;
    }

    if !format.trim().eq_ignore_ascii_case("csv") {
        return None;
    }

    let date_string = timefmt::format(date_format, now, timefmt::DEFAULT_COLUMN_FORMAT);
    let energy = reading
        .energy_expended
        .map(|v| v.to_string())
        .unwrap_or_default();
    let rr_value = reading
        .rr_intervals
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let mut row = String::with_capacity(64);
    append_csv_value(&mut row, &date_string, false, true);
    append_csv_value(&mut row, &reading.beats_per_minute.to_string(), false, true);
    append_csv_value(&mut row, &reading.status.to_string(), false, true);
    append_csv_value(&mut row, &energy, false, true);
    append_csv_value(&mut row, &rr_value, true, false);

    Some(row)
}

fn append_csv_value(row: &mut String, value: &str, always_quote: bool, append_comma: bool) {
    let needs_quotes = always_quote || value.chars().any(|c| c == ',' || c == '\n');

    if !needs_quotes {
        row.push_str(value);
    } else {
        row.push('"');
        for c in value.chars() {
            if c == '"' {
                row.push('\\');
            }
            row.push(c);
        }
        row.push('"');
    }

    if append_comma {
        row.push(',');
    }
}
