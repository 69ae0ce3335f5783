use crate::{Result, constants::FIELD_NOT_PRESENT, error::Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single Wiegand pulse symbol.
///
/// The protocol carries one bit per pulse: a falling edge on the D0 line
/// signals a zero, a falling edge on the D1 line signals a one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Bit {
    Zero = 0,
    One = 1,
}

impl Bit {
    /// Create a bit from a u8 value.
    ///
    /// # Errors
    /// Returns `Error::FieldRange` if the value is not 0 or 1.
    #[inline]
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Bit::Zero),
            1 => Ok(Bit::One),
            _ => Err(Error::FieldRange(format!("bit must be 0 or 1, got {value}"))),
        }
    }

    /// Convert the bit to a u8 value.
    #[inline]
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` for [`Bit::One`].
    #[inline]
    #[must_use]
    pub fn is_set(self) -> bool {
        matches!(self, Bit::One)
    }
}

impl From<bool> for Bit {
    fn from(set: bool) -> Self {
        if set { Bit::One } else { Bit::Zero }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_u8())
    }
}

/// Result of decoding one captured Wiegand frame.
///
/// Produced once per frame and never mutated afterwards. Consumers (access
/// decision, display, telemetry) only read it. The serialized field names
/// match the telemetry shape the original reader firmware published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedFrame {
    /// Number of bits received for this frame.
    pub bits: usize,

    /// Format name, or `"Unknown"` when no descriptor matched the bit count.
    #[serde(rename = "format")]
    pub name: String,

    /// Facility code, or -1 when the format defines no facility code span
    /// or the format is unknown.
    #[serde(rename = "fc")]
    pub facility_code: i64,

    /// Card number, or -1 when the format is unknown.
    #[serde(rename = "cn")]
    pub card_number: i64,

    /// True when every parity check of the format passed (vacuously true for
    /// formats defining none). Always false for unknown formats.
    pub parity_ok: bool,

    /// Big-endian hexadecimal rendering of the full bit range, e.g.
    /// `"0x2180E271"`, or `"Error"` when the frame was too wide to render.
    #[serde(rename = "hex")]
    pub raw_hex: String,
}

impl DecodedFrame {
    /// Build the best-effort result for a bit count with no registered format.
    #[must_use]
    pub fn unknown(bits: usize, raw_hex: String) -> Self {
        DecodedFrame {
            bits,
            name: crate::constants::UNKNOWN_FORMAT_NAME.to_string(),
            facility_code: FIELD_NOT_PRESENT,
            card_number: FIELD_NOT_PRESENT,
            parity_ok: false,
            raw_hex,
        }
    }

    /// Returns `true` when a format descriptor matched this frame.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.name != crate::constants::UNKNOWN_FORMAT_NAME
    }

    /// Returns `true` when the format defined a facility code span.
    #[must_use]
    pub fn has_facility_code(&self) -> bool {
        self.facility_code != FIELD_NOT_PRESENT
    }
}

impl fmt::Display for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({} bits) FC:{} CN:{} parity {}",
            self.name,
            self.bits,
            self.facility_code,
            self.card_number,
            if self.parity_ok { "PASS" } else { "FAIL" }
        )
    }
}

/// Event emitted to the access-decision and telemetry collaborators, exactly
/// once per successfully decoded frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardReadEvent {
    /// Facility code copied from the frame (-1 when absent).
    #[serde(rename = "fc")]
    pub facility_code: i64,

    /// Card number copied from the frame (-1 for unknown formats).
    #[serde(rename = "cn")]
    pub card_number: i64,

    /// The full decode result.
    pub frame: DecodedFrame,

    /// When the frame was finalized.
    pub timestamp: DateTime<Utc>,
}

impl CardReadEvent {
    /// Wrap a decoded frame with the current timestamp.
    #[must_use]
    pub fn new(frame: DecodedFrame) -> Self {
        CardReadEvent {
            facility_code: frame.facility_code,
            card_number: frame.card_number,
            timestamp: Utc::now(),
            frame,
        }
    }
}
