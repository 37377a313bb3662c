//! Date formatting and `%date[:format]%` token substitution
//!
//! Settings written for the original monitor carry .NET-style date format
//! strings ("MM-dd-yyyy"), so this module translates those tokens to chrono
//! specifiers instead of exposing strftime directly. The reserved "OA"
//! format renders an OLE Automation serial day number for spreadsheet
//! interchange.

use chrono::{NaiveDate, NaiveDateTime};

/// Default format for `%date%` tokens substituted into file paths
pub const DEFAULT_FILENAME_FORMAT: &str = "yyyy-MM-dd hh-mm tt";

/// Default format for the CSV timestamp column (empty = default rendering)
pub const DEFAULT_COLUMN_FORMAT: &str = "";

/// Characters never allowed in a file name component; replaced with `-`.
/// The Windows set, kept on all hosts so rendered paths stay portable.
const INVALID_FILENAME_CHARS: &[char] = &['"', '<', '>', '|', ':', '*', '?', '\\', '/'];

/// Replace every `%date%` / `%date:<format>%` token in `input` with the
/// given instant rendered accordingly. With `for_filepath` set, the rendered
/// token text is sanitized for filesystem use (the surrounding path is left
/// alone).
pub fn format_string_tokens(
    input: &str,
    datetime: NaiveDateTime,
    default_format: &str,
    for_filepath: bool,
) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while !rest.is_empty() {
        if rest.starts_with('%') {
            if let Some((formatter, token_len)) = parse_date_token(rest) {
                let rendered = format(formatter, datetime, default_format);
                if for_filepath {
                    out.push_str(&sanitize_path(&rendered));
                } else {
                    out.push_str(&rendered);
                }
                rest = &rest[token_len..];
                continue;
            }
        }

        let ch = rest.chars().next().expect("non-empty remainder");
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// Try to parse a `%date[:format]%` token at the start of `s`.
/// Returns the inner format string and the token's byte length.
fn parse_date_token(s: &str) -> Option<(&str, usize)> {
    let rest = s.strip_prefix('%')?;
    let keyword = rest.get(..4)?;
    if !keyword.eq_ignore_ascii_case("date") {
        return None;
    }

    let after = &rest[4..];
    if after.starts_with('%') {
        return Some(("", "%date%".len()));
    }
    if let Some(after_colon) = after.strip_prefix(':') {
        let end = after_colon.find('%')?;
        return Some((&after_colon[..end], 1 + 4 + 1 + end + 1));
    }
    None
}

/// Replace characters invalid in a file name with `-`
pub fn sanitize_path(path: &str) -> String {
    path.chars()
        .map(|c| {
            if c.is_control() || INVALID_FILENAME_CHARS.contains(&c) {
                '-'
            } else {
                c
            }
        })
        .collect()
}

/// Render an instant with a .NET-style format string.
///
/// Blank formatters fall back to `default_format`; a blank default renders
/// `%Y-%m-%d %H:%M:%S`; `OA` (any case) renders the serial day number.
pub fn format(formatter: &str, datetime: NaiveDateTime, default_format: &str) -> String {
    let formatter = if formatter.trim().is_empty() {
        default_format
    } else {
        formatter
    };

    match formatter.to_uppercase().as_str() {
        "OA" => format_oa(datetime),
        "" => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => datetime
            .format(&net_format_to_chrono(formatter))
            .to_string(),
    }
}

/// Days (fractional) since the OLE Automation epoch, 1899-12-30.
fn format_oa(datetime: NaiveDateTime) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .expect("valid OA epoch")
        .and_hms_opt(0, 0, 0)
        .expect("valid OA epoch time");

    let millis = datetime.signed_duration_since(epoch).num_milliseconds();
    (millis as f64 / 86_400_000.0).to_string()
}

/// Translate a .NET date format string to chrono specifiers.
///
/// Covers the tokens that appear in real settings files (y/M/d/H/h/m/s/t/f
/// runs and quoted literals); unknown letters are dropped.
fn net_format_to_chrono(fmt: &str) -> String {
    let chars: Vec<char> = fmt.chars().collect();
    let mut out = String::with_capacity(fmt.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // Quoted literal: copy verbatim up to the closing quote.
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() {
            let mut run = 1;
            while i + run < chars.len() && chars[i + run] == c {
                run += 1;
            }
            out.push_str(map_specifier(c, run));
            i += run;
            continue;
        }

        push_literal(&mut out, c);
        i += 1;
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

fn map_specifier(c: char, run: usize) -> &'static str {
    match (c, run) {
        ('y', r) if r >= 3 => "%Y",
        ('y', _) => "%y",
        ('M', r) if r >= 4 => "%B",
        ('M', 3) => "%b",
        ('M', 2) => "%m",
        ('M', _) => "%-m",
        ('d', r) if r >= 4 => "%A",
        ('d', 3) => "%a",
        ('d', 2) => "%d",
        ('d', _) => "%-d",
        ('H', r) if r >= 2 => "%H",
        ('H', _) => "%-H",
        ('h', r) if r >= 2 => "%I",
        ('h', _) => "%-I",
        ('m', r) if r >= 2 => "%M",
        ('m', _) => "%-M",
        ('s', r) if r >= 2 => "%S",
        ('s', _) => "%-S",
        ('t', _) => "%p",
        ('f', r) if r >= 6 => "%6f",
        ('f', _) => "%3f",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_instant() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1990, 12, 25)
            .unwrap()
            .and_hms_opt(1, 2, 20)
            .unwrap()
    }

    fn assert_tokens(input: &str, expected: &str) {
        let actual = format_string_tokens(input, fixed_instant(), DEFAULT_FILENAME_FORMAT, false);
        assert_eq!(actual, expected);
    }

    #[test]
    fn token_parser_exchanges_tokens() {
        assert_tokens("No tokens", "No tokens");
        assert_tokens("Token at end %date%", "Token at end 1990-12-25 01-02 AM");
        assert_tokens("Token at end %date:MM-dd-yyyy%", "Token at end 12-25-1990");
        assert_tokens("%date:yyyy%-middle-%date:yyyy%", "1990-middle-1990");
    }

    #[test]
    fn oa_serial_day_number() {
        let rendered = format("OA", fixed_instant(), DEFAULT_COLUMN_FORMAT);
        assert!(rendered.starts_with("33232.0432870"), "got {rendered}");
        // Case-insensitive.
        assert_eq!(format("oa", fixed_instant(), ""), rendered);
    }

    #[test]
    fn blank_formatter_uses_default_then_fallback() {
        assert_eq!(
            format("", fixed_instant(), DEFAULT_COLUMN_FORMAT),
            "1990-12-25 01:02:20"
        );
        assert_eq!(
            format("  ", fixed_instant(), "yyyy"),
            "1990"
        );
    }

    #[test]
    fn filepath_substitution_sanitizes_only_the_token() {
        let rendered = format_string_tokens(
            r"C:\foo\test-%date:MM-dd-yyyy%",
            fixed_instant(),
            DEFAULT_FILENAME_FORMAT,
            true,
        );
        assert_eq!(rendered, r"C:\foo\test-12-25-1990");

        let rendered = format_string_tokens(
            r"C:\foo\test-%date:MM/dd/yyyy%",
            fixed_instant(),
            DEFAULT_FILENAME_FORMAT,
            true,
        );
        assert_eq!(rendered, r"C:\foo\test-12-25-1990");
    }

    #[test]
    fn sanitize_replaces_invalid_chars() {
        assert_eq!(sanitize_path("a:b/c?d"), "a-b-c-d");
        assert_eq!(sanitize_path("plain name"), "plain name");
    }

    #[test]
    fn incomplete_tokens_pass_through() {
        assert_tokens("50% of %dates are plain", "50% of %dates are plain");
        assert_tokens("unterminated %date:MM", "unterminated %date:MM");
    }

    #[test]
    fn quoted_literals_survive_translation() {
        assert_eq!(
            format("yyyy'y'MM", fixed_instant(), ""),
            "1990y12"
        );
    }
}
