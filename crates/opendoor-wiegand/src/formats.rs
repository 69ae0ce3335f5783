//! Wiegand format descriptors.
//!
//! A format is identified solely by the total number of bits received: there
//! is no in-band format marker in the Wiegand protocol. Each descriptor names
//! the inclusive bit spans of the facility code and card number and lists the
//! parity checks that guard them. All positions are 0-indexed from the first
//! bit received, which is also the most significant bit of the frame.
//!
//! The built-in table carries the common HID/ATS formats. Field spans and
//! parity masks follow the published HID card format references; the
//! Corporate 1000 formats interleave their parity coverage rather than using
//! contiguous halves, which is why [`ParityCheck`] stores an explicit
//! position list instead of a range.

use opendoor_core::{Error, Result};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Parity polarity for one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParityKind {
    /// Parity bit makes the total count of ones even.
    Even,
    /// Parity bit makes the total count of ones odd.
    Odd,
}

impl ParityKind {
    /// The parity bit value implied by `ones` set bits among the covered
    /// data positions.
    #[inline]
    #[must_use]
    pub fn expected_bit(self, ones: usize) -> bool {
        match self {
            ParityKind::Even => ones % 2 == 1,
            ParityKind::Odd => ones % 2 == 0,
        }
    }
}

/// Inclusive span of bit positions within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRange {
    /// First position of the span.
    pub start: usize,
    /// Last position of the span (inclusive).
    pub end: usize,
}

impl BitRange {
    /// Create a span, validating `start <= end`.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` for an inverted span.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidFormat(format!(
                "bit range start {start} past end {end}"
            )));
        }
        Ok(BitRange { start, end })
    }

    /// Width of the span in bits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false // an inclusive span always covers at least one bit
    }

    /// Iterate the covered positions in receive order.
    pub fn positions(&self) -> impl Iterator<Item = usize> + use<> {
        self.start..=self.end
    }
}

/// One parity check: the position of the parity bit itself and the data
/// positions it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityCheck {
    /// Position of the parity bit within the frame.
    pub parity_bit: usize,
    /// Positions whose set-bit count this check guards.
    pub data_bits: Vec<usize>,
    /// Even or odd polarity.
    pub kind: ParityKind,
}

impl ParityCheck {
    /// Even-parity check over the given positions.
    #[must_use]
    pub fn even(parity_bit: usize, data_bits: Vec<usize>) -> Self {
        ParityCheck {
            parity_bit,
            data_bits,
            kind: ParityKind::Even,
        }
    }

    /// Odd-parity check over the given positions.
    #[must_use]
    pub fn odd(parity_bit: usize, data_bits: Vec<usize>) -> Self {
        ParityCheck {
            parity_bit,
            data_bits,
            kind: ParityKind::Odd,
        }
    }
}

/// Immutable description of one card format.
///
/// Loaded once and shared by reference across all decode calls; nothing here
/// is mutated after table construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Total bits in a frame of this format; also the table key.
    pub bits: usize,
    /// Human-readable format name.
    pub name: String,
    /// Facility code span, absent for card-number-only formats.
    pub facility_code: Option<BitRange>,
    /// Card number span, always present.
    pub card_number: BitRange,
    /// Parity checks in evaluation order. May be empty, in which case a
    /// frame of this format is vacuously parity-clean.
    pub parity_checks: Vec<ParityCheck>,
}

impl FormatDescriptor {
    /// Check internal consistency: every referenced position must fall
    /// inside the frame.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.bits == 0 {
            return Err(Error::InvalidFormat(format!(
                "format '{}' has zero bits",
                self.name
            )));
        }
        if let Some(fc) = &self.facility_code
            && fc.end >= self.bits
        {
            return Err(Error::InvalidFormat(format!(
                "format '{}': facility code span ends at {} in a {}-bit frame",
                self.name, fc.end, self.bits
            )));
        }
        if self.card_number.end >= self.bits {
            return Err(Error::InvalidFormat(format!(
                "format '{}': card number span ends at {} in a {}-bit frame",
                self.name, self.card_number.end, self.bits
            )));
        }
        for check in &self.parity_checks {
            if check.parity_bit >= self.bits {
                return Err(Error::InvalidFormat(format!(
                    "format '{}': parity bit {} outside {}-bit frame",
                    self.name, check.parity_bit, self.bits
                )));
            }
            if let Some(&pos) = check.data_bits.iter().find(|&&p| p >= self.bits) {
                return Err(Error::InvalidFormat(format!(
                    "format '{}': parity data bit {} outside {}-bit frame",
                    self.name, pos, self.bits
                )));
            }
        }
        Ok(())
    }
}

/// Lookup table from total bit count to format descriptor.
///
/// "Not found" is a valid, non-fatal outcome: the decoder still reports the
/// raw frame for unknown bit counts.
#[derive(Debug, Clone, Default)]
pub struct FormatTable {
    formats: HashMap<usize, FormatDescriptor>,
}

static BUILTIN: LazyLock<FormatTable> = LazyLock::new(|| {
    let mut table = FormatTable::empty();
    for desc in builtin_formats() {
        table.formats.insert(desc.bits, desc);
    }
    table
});

impl FormatTable {
    /// Table with no formats registered.
    #[must_use]
    pub fn empty() -> Self {
        FormatTable {
            formats: HashMap::new(),
        }
    }

    /// The compiled-in table of common HID/ATS formats.
    #[must_use]
    pub fn builtin() -> &'static FormatTable {
        &BUILTIN
    }

    /// Register a descriptor, keyed by its bit count. Replaces any existing
    /// entry for the same count.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` if the descriptor fails validation.
    pub fn insert(&mut self, descriptor: FormatDescriptor) -> Result<()> {
        descriptor.validate()?;
        self.formats.insert(descriptor.bits, descriptor);
        Ok(())
    }

    /// Find the descriptor for a received bit count.
    #[must_use]
    pub fn lookup(&self, bit_count: usize) -> Option<&FormatDescriptor> {
        self.formats.get(&bit_count)
    }

    /// Number of registered formats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Iterate registered descriptors in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &FormatDescriptor> {
        self.formats.values()
    }
}

fn span(start: usize, end: usize) -> Vec<usize> {
    (start..=end).collect()
}

fn builtin_formats() -> Vec<FormatDescriptor> {
    vec![
        FormatDescriptor {
            bits: 26,
            name: "STANDARD 26-bit (H10301)".to_string(),
            facility_code: Some(BitRange { start: 1, end: 8 }),
            card_number: BitRange { start: 9, end: 24 },
            parity_checks: vec![
                ParityCheck::even(0, span(1, 12)),
                ParityCheck::odd(25, span(13, 24)),
            ],
        },
        FormatDescriptor {
            bits: 32,
            name: "ATS WIEGAND 32-Bit".to_string(),
            facility_code: Some(BitRange { start: 1, end: 13 }),
            card_number: BitRange { start: 14, end: 30 },
            parity_checks: vec![
                ParityCheck::even(0, span(1, 13)),
                ParityCheck::odd(31, span(14, 30)),
            ],
        },
        FormatDescriptor {
            bits: 34,
            name: "HID STANDARD 34-Bit".to_string(),
            facility_code: Some(BitRange { start: 1, end: 16 }),
            card_number: BitRange { start: 17, end: 32 },
            parity_checks: vec![
                ParityCheck::even(0, span(1, 16)),
                ParityCheck::odd(33, span(17, 32)),
            ],
        },
        FormatDescriptor {
            bits: 35,
            name: "HID 35BIT CORPORATE 1000".to_string(),
            facility_code: Some(BitRange { start: 2, end: 13 }),
            card_number: BitRange { start: 14, end: 33 },
            parity_checks: vec![
                ParityCheck::even(
                    1,
                    vec![
                        2, 3, 5, 6, 8, 9, 11, 12, 14, 15, 17, 18, 20, 21, 23, 24, 26, 27, 29, 30,
                        32, 33,
                    ],
                ),
                ParityCheck::odd(
                    34,
                    vec![
                        1, 2, 4, 5, 7, 8, 10, 11, 13, 14, 16, 17, 19, 20, 22, 23, 25, 26, 28, 29,
                        31, 32,
                    ],
                ),
            ],
        },
        FormatDescriptor {
            bits: 37,
            name: "HID 37-bit (H10302)".to_string(),
            facility_code: None,
            card_number: BitRange { start: 1, end: 35 },
            parity_checks: vec![
                ParityCheck::even(0, span(1, 18)),
                ParityCheck::odd(36, span(19, 35)),
            ],
        },
        FormatDescriptor {
            bits: 48,
            name: "HID 48BIT CORPORATE 1000 (H2004064)".to_string(),
            facility_code: Some(BitRange { start: 2, end: 23 }),
            card_number: BitRange { start: 24, end: 46 },
            parity_checks: vec![
                ParityCheck::even(
                    1,
                    vec![
                        3, 4, 6, 7, 9, 10, 12, 13, 15, 16, 18, 19, 21, 22, 24, 25, 27, 28, 30, 31,
                        33, 34, 36, 37, 39, 40, 42, 43, 45, 46,
                    ],
                ),
                ParityCheck::odd(
                    47,
                    vec![
                        2, 3, 5, 6, 8, 9, 11, 12, 14, 15, 17, 18, 20, 21, 23, 24, 26, 27, 29, 30,
                        32, 33, 35, 36, 38, 39, 41, 42, 44, 45,
                    ],
                ),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(26, "STANDARD 26-bit (H10301)")]
    #[case(32, "ATS WIEGAND 32-Bit")]
    #[case(34, "HID STANDARD 34-Bit")]
    #[case(35, "HID 35BIT CORPORATE 1000")]
    #[case(37, "HID 37-bit (H10302)")]
    #[case(48, "HID 48BIT CORPORATE 1000 (H2004064)")]
    fn test_builtin_lookup(#[case] bits: usize, #[case] name: &str) {
        let desc = FormatTable::builtin().lookup(bits).unwrap();
        assert_eq!(desc.bits, bits);
        assert_eq!(desc.name, name);
    }

    #[rstest]
    #[case(0)]
    #[case(25)]
    #[case(27)]
    #[case(96)]
    fn test_builtin_lookup_miss(#[case] bits: usize) {
        assert!(FormatTable::builtin().lookup(bits).is_none());
    }

    #[test]
    fn test_builtin_descriptors_are_consistent() {
        let table = FormatTable::builtin();
        assert_eq!(table.len(), 6);
        for desc in table.iter() {
            desc.validate().unwrap();
        }
    }

    #[test]
    fn test_h10301_spans() {
        let desc = FormatTable::builtin().lookup(26).unwrap();
        let fc = desc.facility_code.unwrap();
        assert_eq!((fc.start, fc.end), (1, 8));
        assert_eq!(fc.len(), 8);
        assert_eq!((desc.card_number.start, desc.card_number.end), (9, 24));
        assert_eq!(desc.card_number.len(), 16);
    }

    #[test]
    fn test_h10302_has_no_facility_code() {
        let desc = FormatTable::builtin().lookup(37).unwrap();
        assert!(desc.facility_code.is_none());
        assert_eq!((desc.card_number.start, desc.card_number.end), (1, 35));
    }

    #[test]
    fn test_parity_kind_expected_bit() {
        // Even parity: bit set only when the data count is odd.
        assert!(!ParityKind::Even.expected_bit(0));
        assert!(ParityKind::Even.expected_bit(3));
        // Odd parity: bit set when the data count is even.
        assert!(ParityKind::Odd.expected_bit(0));
        assert!(!ParityKind::Odd.expected_bit(3));
    }

    #[test]
    fn test_bit_range_rejects_inverted_span() {
        assert!(BitRange::new(9, 3).is_err());
        let range = BitRange::new(3, 9).unwrap();
        assert_eq!(range.len(), 7);
        assert_eq!(range.positions().collect::<Vec<_>>(), span(3, 9));
    }

    #[test]
    fn test_insert_rejects_out_of_frame_span() {
        let mut table = FormatTable::empty();
        let result = table.insert(FormatDescriptor {
            bits: 8,
            name: "bogus".to_string(),
            facility_code: None,
            card_number: BitRange { start: 1, end: 8 },
            parity_checks: vec![],
        });
        assert!(result.is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_insert_replaces_same_bit_count() {
        let mut table = FormatTable::empty();
        table
            .insert(FormatDescriptor {
                bits: 8,
                name: "first".to_string(),
                facility_code: None,
                card_number: BitRange { start: 0, end: 7 },
                parity_checks: vec![],
            })
            .unwrap();
        table
            .insert(FormatDescriptor {
                bits: 8,
                name: "second".to_string(),
                facility_code: None,
                card_number: BitRange { start: 0, end: 7 },
                parity_checks: vec![],
            })
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(8).unwrap().name, "second");
    }
}
