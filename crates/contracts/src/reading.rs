//! Reading - decoder output
//!
//! One structured physiological sample per decoded notification,
//! immutable after construction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sensor-skin contact state, from bits 1-2 of the notification flags.
///
/// The discriminants match the 2-bit field in the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    NotSupported,
    NotSupportedAlt,
    NoContact,
    Contact,
}

impl ContactStatus {
    /// Map the 2-bit wire value to a status.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::NotSupported,
            1 => Self::NotSupportedAlt,
            2 => Self::NoContact,
            _ => Self::Contact,
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Downstream CSV consumers expect the original enum names,
        // including the "NotSupported2" spelling.
        let s = match self {
            Self::NotSupported => "NotSupported",
            Self::NotSupportedAlt => "NotSupported2",
            Self::NoContact => "NoContact",
            Self::Contact => "Contact",
        };
        f.write_str(s)
    }
}

/// One decoded heart-rate measurement.
///
/// Constructed once by the decoder (or synthesized as an error reading at
/// the source boundary), then passed by reference through the registry and
/// discarded. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reading {
    /// Raw flags byte from the notification, kept for diagnostics
    pub flags: u8,

    /// Contact sensor state
    pub status: ContactStatus,

    /// Beats per minute (8 or 16-bit on the wire, practically 0-250)
    pub beats_per_minute: u16,

    /// Cumulative energy expended in kilojoules, if the sensor reports it
    pub energy_expended: Option<u16>,

    /// Beat-to-beat intervals in 1/1024-second units, oldest first
    pub rr_intervals: Vec<u16>,

    /// True when this reading carries a failure instead of a sample;
    /// record sinks suppress such readings entirely
    pub is_error: bool,

    /// Human-readable message when `is_error` is set
    pub error_message: Option<String>,
}

impl Reading {
    /// Synthesize an error reading for a source/decode failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }
}
