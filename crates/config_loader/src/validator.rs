//! Settings validation module
//!
//! Validation rules:
//! - disconnected_timeout_secs > 0
//! - udp hostname/port configured together
//! - no control characters in file targets

use contracts::{ContractError, RelaySettings};

/// Validate a settings snapshot
///
/// Returns the first error encountered, or Ok(()).
///
/// Deliberately lax about per-sink targets: an unrecognized log format or a
/// half-configured UDP endpoint disables that one sink at rebuild time, it
/// does not reject the whole settings file.
pub fn validate(settings: &RelaySettings) -> Result<(), ContractError> {
    validate_timeout(settings)?;
    validate_udp(settings)?;
    validate_file_targets(settings)?;
    Ok(())
}

fn validate_timeout(settings: &RelaySettings) -> Result<(), ContractError> {
    if settings.source.disconnected_timeout_secs == 0 {
        return Err(ContractError::config_validation(
            "source.disconnected_timeout_secs",
            "timeout must be > 0",
        ));
    }
    Ok(())
}

/// A hostname without a port (or vice versa) is almost certainly a typo,
/// unlike a fully blank section which simply disables the sink.
fn validate_udp(settings: &RelaySettings) -> Result<(), ContractError> {
    let udp = &settings.udp;
    let has_host = !udp.hostname.trim().is_empty();
    let has_port = udp.port != 0;

    if has_host != has_port {
        return Err(ContractError::config_validation(
            "udp",
            "hostname and port must be configured together",
        ));
    }
    Ok(())
}

fn validate_file_targets(settings: &RelaySettings) -> Result<(), ContractError> {
    for (field, target) in [
        ("log.file", &settings.log.file),
        ("ibi.file", &settings.ibi.file),
        ("bpm.file", &settings.bpm.file),
    ] {
        if target.chars().any(|c| c.is_control()) {
            return Err(ContractError::config_validation(
                field,
                "file path contains control characters",
            ));
        }
    }
    Ok(())
}
