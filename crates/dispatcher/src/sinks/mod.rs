//! Sink implementations
//!
//! Contains LogFileSink, IbiSink, BpmFileSink, and UdpSink.
//!
//! File sinks do not hold handles between writes: every write opens the
//! target fresh in shared mode so external tools can tail or replace the
//! file while the relay runs, and settings reloads never race a held handle.

mod bpm_file;
mod ibi;
mod log_file;
mod udp;

pub use self::bpm_file::BpmFileSink;
pub use self::ibi::IbiSink;
pub use self::log_file::LogFileSink;
pub use self::udp::UdpSink;

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Append `line` plus a CRLF terminator as one write-then-flush.
pub(crate) fn append_line(path: &Path, line: &str) -> io::Result<()> {
    let mut buf = Vec::with_capacity(line.len() + 2);
    buf.extend_from_slice(line.as_bytes());
    buf.extend_from_slice(b"\r\n");

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(&buf)?;
    file.flush()
}

/// Replace the file content entirely.
pub(crate) fn overwrite(path: &Path, content: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()
}
