//! Frame synthesis.
//!
//! The inverse of [`decode`](crate::decoder::decode): given a format
//! descriptor and field values, produce the pulse train a reader would emit
//! for that card. Mock readers use this to present cards by facility code and
//! card number, and the round-trip tests lean on it for known-good frames.

use crate::capture::FrameSnapshot;
use crate::formats::{BitRange, FormatDescriptor};
use opendoor_core::{Bit, Error, Result, constants::FIELD_NOT_PRESENT};

/// Build the pulse sequence for a card of the given format.
///
/// Parity bits are computed in the order the descriptor declares its checks.
/// Order matters: the Corporate 1000 formats' later checks cover earlier
/// parity positions, so a check must see the parity bits computed before it.
///
/// Pass `facility_code = -1` for formats without a facility code span.
///
/// # Errors
/// - `Error::InvalidFormat` if a facility code is supplied for a format
///   without one, or if the descriptor references positions outside the
///   frame.
/// - `Error::FieldRange` if a field value is negative (other than the -1
///   facility sentinel) or too wide for its span.
pub fn encode(
    descriptor: &FormatDescriptor,
    facility_code: i64,
    card_number: i64,
) -> Result<Vec<Bit>> {
    let mut bits = vec![false; descriptor.bits];

    match (&descriptor.facility_code, facility_code) {
        (Some(range), fc) if fc >= 0 => write_field(&mut bits, range, fc, "facility code")?,
        (Some(_), fc) => {
            return Err(Error::FieldRange(format!(
                "facility code must be non-negative, got {fc}"
            )));
        }
        (None, FIELD_NOT_PRESENT) => {}
        (None, fc) => {
            return Err(Error::InvalidFormat(format!(
                "format '{}' has no facility code span, got {fc}",
                descriptor.name
            )));
        }
    }

    if card_number < 0 {
        return Err(Error::FieldRange(format!(
            "card number must be non-negative, got {card_number}"
        )));
    }
    write_field(&mut bits, &descriptor.card_number, card_number, "card number")?;

    for check in &descriptor.parity_checks {
        let mut ones = 0usize;
        for &pos in &check.data_bits {
            match bits.get(pos) {
                Some(true) => ones += 1,
                Some(false) => {}
                None => {
                    return Err(Error::InvalidFormat(format!(
                        "format '{}': parity data bit {pos} outside {}-bit frame",
                        descriptor.name, descriptor.bits
                    )));
                }
            }
        }
        let slot = bits.get_mut(check.parity_bit).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "format '{}': parity bit {} outside {}-bit frame",
                descriptor.name, check.parity_bit, descriptor.bits
            ))
        })?;
        *slot = check.kind.expected_bit(ones);
    }

    Ok(bits.into_iter().map(Bit::from).collect())
}

/// Encode straight to a packed snapshot, as the decoder consumes it.
///
/// # Errors
/// Same conditions as [`encode`].
pub fn encode_snapshot(
    descriptor: &FormatDescriptor,
    facility_code: i64,
    card_number: i64,
) -> Result<FrameSnapshot> {
    Ok(FrameSnapshot::from_bits(&encode(
        descriptor,
        facility_code,
        card_number,
    )?))
}

fn write_field(bits: &mut [bool], range: &BitRange, value: i64, field: &str) -> Result<()> {
    let width = range.len();
    if width < 63 && value > (1i64 << width) - 1 {
        return Err(Error::FieldRange(format!(
            "{field} {value} does not fit in {width} bits"
        )));
    }
    let frame_len = bits.len();
    for (offset, pos) in range.positions().enumerate() {
        let slot = bits.get_mut(pos).ok_or_else(|| {
            Error::InvalidFormat(format!("{field} bit {pos} outside {frame_len}-bit frame"))
        })?;
        *slot = (value >> (width - 1 - offset)) & 1 == 1;
    }
    Ok(())
}
