//! Enum wrapper for pulse input dispatch.
//!
//! Native `async fn` in traits (RPITIT) is not object-safe, so the reader
//! cannot hold a `Box<dyn PulseInput>`. The enum wrapper provides concrete
//! type dispatch at compile time instead, the same pattern the rest of the
//! codebase uses for device abstraction.

use crate::error::Result;
use crate::mock::MockWiegand;
use crate::traits::PulseInput;
use opendoor_core::Bit;

/// Enum wrapper for pulse input dispatch.
///
/// # Examples
///
/// ```
/// use opendoor_reader::{AnyPulseInput, MockWiegand};
///
/// let (input, _handle) = MockWiegand::new();
/// let any_input = AnyPulseInput::Mock(input);
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyPulseInput {
    /// Mock pulse source for development and testing.
    Mock(MockWiegand),
    // A gpio-backed variant belongs here once the `hardware-gpio` feature
    // grows a real implementation.
}

impl PulseInput for AnyPulseInput {
    async fn next_pulse(&mut self) -> Result<Bit> {
        match self {
            Self::Mock(input) => input.next_pulse().await,
        }
    }
}
