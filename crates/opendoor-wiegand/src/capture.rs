//! Pulse capture and frame assembly.
//!
//! [`PulseCapture`] is the single owned structure behind the two pulse
//! handlers and the polling loop. It holds a fixed, pre-sized bit buffer, the
//! current bit index, and the last-pulse timestamp, all behind one mutex.
//! The mutex stands in for the interrupt-disable window of the original
//! hardware: [`PulseCapture::record`] (the interrupt-context operation) holds
//! it for a handful of instructions, and [`PulseCapture::try_finalize`] (the
//! poll-loop operation) holds it only for the copy-and-clear of at most a few
//! dozen bytes. A pulse arriving while a frame is being finalized waits on
//! the lock and is recorded into the next frame — never lost, never mixed
//! into the frame being copied out.
//!
//! Capture state machine per frame: Idle (`index == 0`) → Accumulating
//! (pulses arriving within the timeout) → Finalizing (quiescence exceeded,
//! copy-and-reset under the lock) → Idle. Buffer overflow is deliberately
//! not a frame boundary: pulses past `max_bits` are dropped at the storage
//! layer but still refresh the timestamp, so the quiescence timeout remains
//! the sole authority on frame completion and an overflowed reader can never
//! wedge.

use opendoor_core::Bit;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Immutable snapshot of one finished frame: the packed bits plus the bit
/// count, handed to the decoder while the live buffer is reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSnapshot {
    bits: Box<[u8]>,
    bit_count: usize,
}

impl FrameSnapshot {
    /// Pack a bit sequence into a snapshot, MSB-first per byte.
    #[must_use]
    pub fn from_bits(bits: &[Bit]) -> Self {
        let mut packed = vec![0u8; bits.len().div_ceil(8)];
        for (pos, bit) in bits.iter().enumerate() {
            if bit.is_set() {
                packed[pos / 8] |= 1 << (7 - pos % 8);
            }
        }
        FrameSnapshot {
            bits: packed.into_boxed_slice(),
            bit_count: bits.len(),
        }
    }

    /// Number of bits captured in this frame.
    #[must_use]
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Read the bit at `pos` (0 = first bit received). Out-of-range reads
    /// return `None` rather than panicking.
    #[must_use]
    pub fn bit(&self, pos: usize) -> Option<bool> {
        if pos >= self.bit_count {
            return None;
        }
        let byte = self.bits.get(pos / 8)?;
        Some((byte >> (7 - pos % 8)) & 1 == 1)
    }

    /// The packed bytes, MSB-first.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Render the frame as a "0"/"1" string, first bit received on the left.
    #[must_use]
    pub fn binary_string(&self) -> String {
        (0..self.bit_count)
            .map(|pos| if self.bit(pos) == Some(true) { '1' } else { '0' })
            .collect()
    }
}

struct CaptureState {
    buf: Box<[u8]>,
    index: usize,
    last_pulse: Instant,
}

impl std::fmt::Debug for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureState")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Shared capture state for one reader channel.
///
/// The only two ways to touch the buffer are [`record`](Self::record) and
/// [`try_finalize`](Self::try_finalize); no other code path can race on it.
#[derive(Debug)]
pub struct PulseCapture {
    max_bits: usize,
    state: Mutex<CaptureState>,
}

impl PulseCapture {
    /// Allocate a capture buffer for at most `max_bits` bits, rounded up to
    /// a whole byte. All storage is pre-sized here; the record path never
    /// allocates.
    #[must_use]
    pub fn new(max_bits: usize) -> Self {
        PulseCapture {
            max_bits,
            state: Mutex::new(CaptureState {
                buf: vec![0u8; max_bits.div_ceil(8)].into_boxed_slice(),
                index: 0,
                last_pulse: Instant::now(),
            }),
        }
    }

    /// Configured capacity in bits.
    #[must_use]
    pub fn max_bits(&self) -> usize {
        self.max_bits
    }

    /// Record one pulse. This is the interrupt-context operation: bounded
    /// work, no allocation, no formatting, no panic path.
    ///
    /// If the buffer is full the bit is silently dropped, but the last-pulse
    /// timestamp is refreshed regardless so the quiescence detector still
    /// fires for an overflowed frame.
    pub fn record(&self, bit: Bit) {
        // A poisoned lock only means another thread panicked mid-update of
        // plain integers; the state is still usable and a pulse must never
        // abort the reader.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.index < self.max_bits {
            let byte = state.index / 8;
            let mask = 1u8 << (7 - state.index % 8);
            if bit.is_set() {
                state.buf[byte] |= mask;
            } else {
                state.buf[byte] &= !mask;
            }
            state.index += 1;
        }
        state.last_pulse = Instant::now();
    }

    /// Number of bits accumulated so far in the in-progress frame.
    ///
    /// Diagnostic only; the poll loop uses it to pick its sleep interval.
    #[must_use]
    pub fn pending_bits(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .index
    }

    /// Finalize the in-progress frame if the quiescence window has elapsed.
    ///
    /// Returns `None` while the channel is idle (`index == 0`) or while
    /// pulses are still arriving (`elapsed < timeout`). Otherwise, under the
    /// lock: capture the bit count, copy the buffer into a fresh snapshot,
    /// zero the shared buffer, and reset the cursor — then release the lock
    /// and hand the snapshot to the caller. Decoding always happens outside
    /// the lock so decode latency never blocks pulse capture.
    #[must_use]
    pub fn try_finalize(&self, timeout: Duration) -> Option<FrameSnapshot> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.index == 0 || state.last_pulse.elapsed() < timeout {
            return None;
        }

        let bit_count = state.index;
        let snapshot = FrameSnapshot {
            bits: state.buf[..bit_count.div_ceil(8)].into(),
            bit_count,
        };
        state.buf.fill(0);
        state.index = 0;
        state.last_pulse = Instant::now();
        drop(state);

        Some(snapshot)
    }
}
