//! Core constants for the Wiegand reader.
//!
//! These values mirror the behavior of the physical reader hardware: the
//! capture buffer size, the inter-pulse quiescence window that marks the end
//! of a card transmission, and the sentinel values used when a decoded field
//! is absent or unrenderable.

// ============================================================================
// Capture Configuration
// ============================================================================

/// Default capture buffer capacity in bits.
///
/// Large enough for every format the built-in table knows (the longest is
/// 48-bit Corporate 1000) with headroom for variable-length formats. Pulses
/// past this limit are dropped at the storage layer; they never corrupt
/// memory and never end the frame early.
pub const DEFAULT_MAX_BITS: usize = 96;

/// Upper bound accepted for a configured capture buffer size.
///
/// A glitching configuration file must not make the reader allocate an
/// arbitrarily large buffer.
pub const MAX_CONFIG_BITS: usize = 1024;

/// Default quiescence timeout in milliseconds.
///
/// Wiegand readers space pulses roughly 1-2 ms apart, so 50 ms of silence
/// reliably marks the end of a card transmission without noticeable latency
/// for the user.
pub const DEFAULT_CARD_READ_TIMEOUT_MS: u64 = 50;

/// Default GPIO line carrying "data is 0" pulses.
pub const DEFAULT_D0_PIN: u8 = 21;

/// Default GPIO line carrying "data is 1" pulses.
pub const DEFAULT_D1_PIN: u8 = 22;

// ============================================================================
// Polling Cadence
// ============================================================================

/// Poll interval while a frame is accumulating (microseconds).
///
/// While pulses are arriving the loop only checks the quiescence window, so
/// it can afford to spin fast; the check itself is a clock read.
pub const ACTIVE_POLL_INTERVAL_US: u64 = 100;

/// Poll interval while the reader is idle (milliseconds).
pub const IDLE_POLL_INTERVAL_MS: u64 = 10;

// ============================================================================
// Decode Sentinels
// ============================================================================

/// Sentinel for a decoded field that is absent or undefined.
///
/// Some formats (37-bit H10302) define no facility code span; the decoder
/// reports the field as -1 rather than omitting it, matching the telemetry
/// shape consumers expect.
pub const FIELD_NOT_PRESENT: i64 = -1;

/// Format name reported when no descriptor matches the received bit count.
pub const UNKNOWN_FORMAT_NAME: &str = "Unknown";

/// Substitute string when the raw frame cannot be rendered as hex.
pub const HEX_RENDER_ERROR: &str = "Error";

/// Widest frame the hex renderer can represent.
///
/// The renderer accumulates into a u128; frames beyond this width get the
/// [`HEX_RENDER_ERROR`] sentinel while the rest of decoding proceeds.
pub const MAX_HEX_RENDER_BITS: usize = 128;
