//! Heart-rate measurement payload decoder
//!
//! Pure function over one notification buffer, per the GATT heart rate
//! measurement characteristic (0x2A37). Byte 0 is a flags bitset, all
//! multi-byte fields are little-endian unsigned.

use contracts::{ContactStatus, Reading};

/// Bit 0: BPM is a 16-bit field (otherwise 8-bit)
pub const FLAG_BPM_16BIT: u8 = 1 << 0;
/// Bit 3: energy expended field present
pub const FLAG_ENERGY_EXPENDED: u8 = 1 << 3;
/// Bit 4: RR interval fields present
pub const FLAG_RR_INTERVALS: u8 = 1 << 4;

/// Decode one notification payload.
///
/// Returns `None` when the buffer is shorter than the flag-implied minimum
/// length (flags byte plus one or two BPM bytes); the caller drops the
/// sample. Optional fields are consumed only when flagged: energy expended
/// takes the next two bytes, RR intervals take the remaining bytes two at a
/// time with any odd trailing byte silently ignored.
pub fn decode(buffer: &[u8]) -> Option<Reading> {
    let &flags = buffer.first()?;
    let wide_bpm = flags & FLAG_BPM_16BIT != 0;
    let min_len = if wide_bpm { 3 } else { 2 };

    if buffer.len() < min_len {
        return None;
    }

    let status = ContactStatus::from_bits(flags >> 1);

    let (beats_per_minute, mut cursor) = if wide_bpm {
        (u16::from_le_bytes([buffer[1], buffer[2]]), 3)
    } else {
        (buffer[1] as u16, 2)
    };

    let energy_expended = if flags & FLAG_ENERGY_EXPENDED != 0 && buffer.len() >= cursor + 2 {
        let value = u16::from_le_bytes([buffer[cursor], buffer[cursor + 1]]);
        cursor += 2;
        Some(value)
    } else {
        None
    };

    let rr_intervals = if flags & FLAG_RR_INTERVALS != 0 {
        buffer[cursor..]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    } else {
        Vec::new()
    };

    Some(Reading {
        flags,
        status,
        beats_per_minute,
        energy_expended,
        rr_intervals,
        is_error: false,
        error_message: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bpm(buf: &[u8]) -> u16 {
        decode(buf).unwrap().beats_per_minute
    }

    fn rr(buf: &[u8]) -> Vec<u16> {
        decode(buf).unwrap().rr_intervals
    }

    #[test]
    fn returns_none_when_too_short() {
        assert!(decode(&[]).is_none());
        // Says there's a 16-bit value, but only gives a byte.
        assert!(decode(&[0b00001, 0x12]).is_none());
        // Says there's a byte, but there's nothing.
        assert!(decode(&[0b00000]).is_none());
    }

    #[test]
    fn reads_heart_rate() {
        // Finds 2-byte value.
        assert_eq!(bpm(&[0b00001, 0x01, 0x02]), 0x0201);
        // Single byte value.
        assert_eq!(bpm(&[0b00000, 0x12]), 0x12);
    }

    #[test]
    fn reads_contact_status() {
        assert_eq!(
            decode(&[0b00110, 0x50]).unwrap().status,
            ContactStatus::Contact
        );
        assert_eq!(
            decode(&[0b00100, 0x50]).unwrap().status,
            ContactStatus::NoContact
        );
    }

    #[test]
    fn reads_rr_intervals() {
        assert_eq!(
            rr(&[0b10001, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06]),
            vec![0x0403, 0x0605]
        );
        // Odd trailing byte is ignored.
        assert_eq!(rr(&[0b10000, 0x12, 0x03, 0x04, 0x05]), vec![0x0403]);
    }

    #[test]
    fn rr_absent_without_flag() {
        // Extra bytes without the RR flag are not intervals.
        assert!(rr(&[0b00000, 0x12, 0x03, 0x04]).is_empty());
    }

    #[test]
    fn everything_works_together() {
        let reading = decode(&[0b11001, 0x01, 0x02, 0x22, 0x33, 0x03, 0x04, 0x05, 0x06]).unwrap();

        assert_eq!(reading.beats_per_minute, 0x0201);
        assert_eq!(reading.energy_expended, Some(0x3322));
        assert_eq!(reading.rr_intervals, vec![0x0403, 0x0605]);
        assert!(!reading.is_error);
    }

    #[test]
    fn truncated_energy_field_is_absent() {
        // Energy flagged but only one byte remains.
        let reading = decode(&[0b01000, 0x50, 0x22]).unwrap();
        assert_eq!(reading.beats_per_minute, 0x50);
        assert_eq!(reading.energy_expended, None);
    }
}
