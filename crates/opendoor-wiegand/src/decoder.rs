//! Frame decoding.
//!
//! Decoding is a pure, synchronous computation over a finished
//! [`FrameSnapshot`]: look the format up by bit count, pull the facility code
//! and card number out of their spans MSB-first, and evaluate every parity
//! check. An unrecognized bit count is a valid terminal outcome — the caller
//! still gets the bit count and a hex rendering for diagnostics. Only an
//! empty snapshot (zero bits, i.e. a capture failure) is an error.

use crate::capture::FrameSnapshot;
use crate::formats::{BitRange, FormatTable, ParityCheck};
use opendoor_core::{
    DecodedFrame, Error, Result,
    constants::{FIELD_NOT_PRESENT, HEX_RENDER_ERROR, MAX_HEX_RENDER_BITS},
};

/// Decode one captured frame against a format table.
///
/// # Errors
/// Returns `Error::EmptyFrame` when the snapshot holds zero bits. This is
/// the "no data" outcome and is distinct from an unknown format, which
/// decodes successfully to a [`DecodedFrame`] carrying `-1` sentinels.
pub fn decode(frame: &FrameSnapshot, table: &FormatTable) -> Result<DecodedFrame> {
    let bit_count = frame.bit_count();
    if bit_count == 0 {
        return Err(Error::EmptyFrame);
    }

    let raw_hex = render_hex(frame);

    let Some(descriptor) = table.lookup(bit_count) else {
        return Ok(DecodedFrame::unknown(bit_count, raw_hex));
    };

    let facility_code = descriptor
        .facility_code
        .as_ref()
        .map(|range| read_field(frame, range))
        .unwrap_or(FIELD_NOT_PRESENT);
    let card_number = read_field(frame, &descriptor.card_number);

    // Every check runs even after a failure so each mismatch is observable.
    let mut parity_ok = true;
    for check in &descriptor.parity_checks {
        if !parity_check_passes(frame, check) {
            parity_ok = false;
        }
    }

    Ok(DecodedFrame {
        bits: bit_count,
        name: descriptor.name.clone(),
        facility_code,
        card_number,
        parity_ok,
        raw_hex,
    })
}

/// Render the whole frame as a big-endian hex string.
///
/// Frames wider than the u128 accumulator get the `"Error"` sentinel; the
/// rest of decoding is unaffected.
fn render_hex(frame: &FrameSnapshot) -> String {
    let bit_count = frame.bit_count();
    if bit_count > MAX_HEX_RENDER_BITS {
        return HEX_RENDER_ERROR.to_string();
    }
    let mut value: u128 = 0;
    for pos in 0..bit_count {
        value = (value << 1) | u128::from(frame.bit(pos) == Some(true));
    }
    format!("0x{value:X}")
}

/// Accumulate a field span into an integer, most significant bit first.
fn read_field(frame: &FrameSnapshot, range: &BitRange) -> i64 {
    let mut value: i64 = 0;
    for pos in range.positions() {
        value = (value << 1) | i64::from(frame.bit(pos) == Some(true));
    }
    value
}

/// Evaluate one parity check against the frame.
///
/// A covered position falling outside the frame fails the check, mirroring
/// how the reader treats a truncated frame: the parity cannot be confirmed.
fn parity_check_passes(frame: &FrameSnapshot, check: &ParityCheck) -> bool {
    let Some(actual) = frame.bit(check.parity_bit) else {
        return false;
    };
    let mut ones = 0usize;
    for &pos in &check.data_bits {
        match frame.bit(pos) {
            Some(true) => ones += 1,
            Some(false) => {}
            None => return false,
        }
    }
    actual == check.kind.expected_bit(ones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_snapshot;
    use crate::formats::{FormatDescriptor, FormatTable};
    use opendoor_core::Bit;
    use rstest::rstest;

    fn snapshot(bits: &str) -> FrameSnapshot {
        let bits: Vec<Bit> = bits
            .chars()
            .map(|c| if c == '1' { Bit::One } else { Bit::Zero })
            .collect();
        FrameSnapshot::from_bits(&bits)
    }

    #[test]
    fn test_empty_frame_is_distinct_outcome() {
        let result = decode(&FrameSnapshot::from_bits(&[]), FormatTable::builtin());
        assert!(matches!(result, Err(Error::EmptyFrame)));
    }

    #[rstest]
    #[case("1")]
    #[case("101101")]
    #[case("1111111111111111111111111")] // 25 bits, one short of H10301
    fn test_unknown_bit_count_keeps_raw_data(#[case] bits: &str) {
        let frame = decode(&snapshot(bits), FormatTable::builtin()).unwrap();
        assert_eq!(frame.name, "Unknown");
        assert_eq!(frame.facility_code, -1);
        assert_eq!(frame.card_number, -1);
        assert!(!frame.parity_ok);
        assert_eq!(frame.bits, bits.len());
        assert!(frame.raw_hex.starts_with("0x"));
    }

    #[test]
    fn test_h10301_known_vector() {
        // FC=12 (00001100), CN=5000 (0001001110001000); even parity over
        // bits 1-12 counts 3 ones -> leading bit 1; odd parity over bits
        // 13-24 counts 4 ones -> trailing bit 1.
        let frame = decode(
            &snapshot("10000110000010011100010001"),
            FormatTable::builtin(),
        )
        .unwrap();
        assert_eq!(frame.name, "STANDARD 26-bit (H10301)");
        assert_eq!(frame.facility_code, 12);
        assert_eq!(frame.card_number, 5000);
        assert!(frame.parity_ok);
        assert_eq!(frame.raw_hex, "0x2182711");
    }

    #[test]
    fn test_parity_failure_keeps_extracted_fields() {
        // Same frame as above with the trailing (odd) parity bit flipped.
        let frame = decode(
            &snapshot("10000110000010011100010000"),
            FormatTable::builtin(),
        )
        .unwrap();
        assert_eq!(frame.facility_code, 12);
        assert_eq!(frame.card_number, 5000);
        assert!(!frame.parity_ok);
    }

    #[test]
    fn test_decode_is_pure() {
        let snap = snapshot("10000110000010011100010001");
        let first = decode(&snap, FormatTable::builtin()).unwrap();
        let second = decode(&snap, FormatTable::builtin()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_facility_code_format() {
        let desc = FormatTable::builtin().lookup(37).unwrap();
        let snap = encode_snapshot(desc, -1, 123_456_789).unwrap();
        let frame = decode(&snap, FormatTable::builtin()).unwrap();
        assert_eq!(frame.name, "HID 37-bit (H10302)");
        assert_eq!(frame.facility_code, -1);
        assert_eq!(frame.card_number, 123_456_789);
        assert!(frame.parity_ok);
    }

    #[test]
    fn test_format_without_parity_checks_is_vacuously_ok() {
        let mut table = FormatTable::empty();
        table
            .insert(FormatDescriptor {
                bits: 8,
                name: "bare 8-bit".to_string(),
                facility_code: None,
                card_number: crate::formats::BitRange { start: 0, end: 7 },
                parity_checks: vec![],
            })
            .unwrap();
        let frame = decode(&snapshot("11110000"), &table).unwrap();
        assert_eq!(frame.card_number, 0xF0);
        assert!(frame.parity_ok);
    }

    #[test]
    fn test_hex_render_overflow_sentinel() {
        let mut table = FormatTable::empty();
        table
            .insert(FormatDescriptor {
                bits: 130,
                name: "very wide".to_string(),
                facility_code: None,
                card_number: crate::formats::BitRange { start: 0, end: 31 },
                parity_checks: vec![],
            })
            .unwrap();
        let bits = vec![Bit::One; 130];
        let frame = decode(&FrameSnapshot::from_bits(&bits), &table).unwrap();
        // Hex rendering fails, but field extraction still completes.
        assert_eq!(frame.raw_hex, "Error");
        assert_eq!(frame.card_number, 0xFFFF_FFFF);
        assert!(frame.parity_ok);
    }

    #[test]
    fn test_corporate_1000_interleaved_parity() {
        let desc = FormatTable::builtin().lookup(35).unwrap();
        let snap = encode_snapshot(desc, 2077, 654_321).unwrap();
        let frame = decode(&snap, FormatTable::builtin()).unwrap();
        assert_eq!(frame.name, "HID 35BIT CORPORATE 1000");
        assert_eq!(frame.facility_code, 2077);
        assert_eq!(frame.card_number, 654_321);
        assert!(frame.parity_ok);
    }
}
