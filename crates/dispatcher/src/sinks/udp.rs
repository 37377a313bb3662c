//! UdpSink - fire-and-forget CSV datagrams

use std::io;
use std::net::UdpSocket;

use chrono::Local;
use contracts::{ContractError, Reading, ReadingSink, RelaySettings};
use tracing::{debug, trace, warn};

use crate::csv::csv_row;

/// Sink that sends each non-error reading's CSV row (newline-terminated) as
/// one datagram to the configured endpoint.
///
/// Never validly configured means never sends. A failed send is dropped,
/// not retried and not surfaced; UDP is best-effort by design.
pub struct UdpSink {
    socket: Option<UdpSocket>,
    format: String,
    date_format: String,
}

impl UdpSink {
    /// Create from a settings snapshot; opens and connects the socket once.
    /// An unresolvable endpoint disables the sink rather than failing the
    /// registry rebuild.
    pub fn from_settings(settings: &RelaySettings) -> Self {
        let socket = settings.udp.endpoint().and_then(|endpoint| {
            match Self::connect(&endpoint) {
                Ok(socket) => {
                    debug!(endpoint = %endpoint, "udp sink connected");
                    Some(socket)
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "udp sink disabled");
                    None
                }
            }
        });

        Self {
            socket,
            format: settings.log.format.clone(),
            date_format: settings.log.date_format.clone(),
        }
    }

    fn connect(endpoint: &str) -> io::Result<UdpSocket> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(endpoint)?;
        Ok(socket)
    }

    /// Whether the endpoint validated and the socket is open
    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }
}

impl ReadingSink for UdpSink {
    fn name(&self) -> &str {
        "udp"
    }

    fn reading(&self, reading: &Reading) -> Result<(), ContractError> {
        let Some(socket) = &self.socket else {
            return Ok(());
        };

        let now = Local::now().naive_local();
        let Some(row) = csv_row(&self.format, &self.date_format, reading, now) else {
            return Ok(());
        };

        let mut datagram = row.into_bytes();
        datagram.push(b'\n');

        match socket.send(&datagram) {
            Ok(sent) => trace!(bytes = sent, "udp datagram sent"),
            Err(e) => debug!(error = %e, "udp send failed, reading dropped"),
        }

        Ok(())
    }
}
