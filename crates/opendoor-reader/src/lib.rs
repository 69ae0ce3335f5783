//! Reader runtime for the Wiegand capture core.
//!
//! This crate binds the pure capture/decode pipeline of `opendoor-wiegand`
//! to an actual source of pulses and a polling loop:
//!
//! - [`traits::PulseInput`] abstracts the two data lines of a reader; the
//!   [`mock::MockWiegand`] implementation replays programmatic swipes for
//!   development and testing.
//! - [`reader::WiegandReader`] owns the polling loop: it drains the pulse
//!   input into the shared capture buffer, watches for quiescence, decodes
//!   finished frames, and emits [`CardReadEvent`](opendoor_core::CardReadEvent)s
//!   on a channel owned by [`reader::ReaderHandle`].
//! - [`config::ReaderConfig`] carries the hardware-facing knobs
//!   (line assignments, buffer capacity, quiescence timeout) in the JSON
//!   layout the original reader firmware used.

pub mod config;
pub mod devices;
pub mod error;
pub mod mock;
pub mod reader;
pub mod traits;

pub use config::{ReaderConfig, ReaderMode};
pub use devices::AnyPulseInput;
pub use error::{ReaderError, Result};
pub use mock::{MockWiegand, MockWiegandHandle};
pub use reader::{ReaderHandle, WiegandReader};
pub use traits::PulseInput;
