//! Shared helpers for integration tests.
#![allow(dead_code)] // not every test binary uses every helper

use opendoor_core::Bit;
use opendoor_wiegand::FrameSnapshot;

/// Parse a "0"/"1" string into a pulse sequence.
pub fn bits_from_str(s: &str) -> Vec<Bit> {
    s.chars()
        .map(|c| if c == '1' { Bit::One } else { Bit::Zero })
        .collect()
}

/// Flip the pulse at `pos` and return the modified sequence.
pub fn flip_bit(mut bits: Vec<Bit>, pos: usize) -> Vec<Bit> {
    bits[pos] = if bits[pos].is_set() {
        Bit::Zero
    } else {
        Bit::One
    };
    bits
}

/// Pack a pulse sequence into the snapshot form the decoder consumes.
pub fn snapshot_of(bits: &[Bit]) -> FrameSnapshot {
    FrameSnapshot::from_bits(bits)
}
