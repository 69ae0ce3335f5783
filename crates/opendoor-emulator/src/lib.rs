//! Door simulator built on the Wiegand reader core.
//!
//! Ties the reader loop, the access decision, and a virtual display into the
//! behavior of the original standalone device: swipe a card, watch the
//! four-line panel show the read and the verdict.
//!
//! The display is deliberately dumb (a text buffer standing in for the
//! physical OLED) and the session state machine deliberately small: all the
//! interesting work happens in `opendoor-wiegand` and `opendoor-access`;
//! this crate only renders it.

pub mod display;
pub mod session;

pub use display::VirtualDisplay;
pub use session::{DoorSession, DoorState};
