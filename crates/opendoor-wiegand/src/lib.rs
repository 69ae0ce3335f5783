//! Wiegand frame capture and decoding.
//!
//! This crate implements the capture-and-decode pipeline for two-wire Wiegand
//! card readers:
//!
//! - [`capture`] — a mutex-guarded bit accumulator fed by the pulse handlers,
//!   with quiescence-based frame finalization. The mutex is the software
//!   analog of the interrupt-disable window on the original hardware: a pulse
//!   arriving while a frame is being finalized waits on the lock and lands in
//!   the next frame, never in the one being copied out.
//! - [`formats`] — the immutable table mapping total bit count to a format
//!   descriptor (field spans and parity checks). Bit positions are 0-indexed
//!   from the first bit received.
//! - [`decoder`] — pure, data-driven extraction of facility code and card
//!   number plus parity validation over a finished frame snapshot.
//! - [`encode`] — the inverse mapping, used to synthesize pulse trains for
//!   mock readers and round-trip tests.
//!
//! # Example
//!
//! ```
//! use opendoor_wiegand::{FormatTable, decode, encode_snapshot};
//!
//! let table = FormatTable::builtin();
//! let desc = table.lookup(26).unwrap();
//!
//! let snapshot = encode_snapshot(desc, 12, 5000).unwrap();
//! let frame = decode(&snapshot, table).unwrap();
//!
//! assert_eq!(frame.facility_code, 12);
//! assert_eq!(frame.card_number, 5000);
//! assert!(frame.parity_ok);
//! ```

pub mod capture;
pub mod decoder;
pub mod encode;
pub mod formats;

pub use capture::{FrameSnapshot, PulseCapture};
pub use decoder::decode;
pub use encode::{encode, encode_snapshot};
pub use formats::{BitRange, FormatDescriptor, FormatTable, ParityCheck, ParityKind};
