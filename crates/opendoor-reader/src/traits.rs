//! Pulse input trait definition.
//!
//! A Wiegand reader presents two data lines; each falling edge on one of
//! them is a single bit. [`PulseInput`] abstracts that edge stream so the
//! capture loop can run against mock hardware in development and real GPIO
//! lines in deployment.
//!
//! The trait uses native `async fn` (Edition 2024 RPITIT), so it is not
//! object-safe; use the [`AnyPulseInput`](crate::devices::AnyPulseInput)
//! enum wrapper where dynamic dispatch is needed.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use opendoor_core::Bit;

/// Source of Wiegand pulses for one reader channel.
///
/// # Examples
///
/// ```no_run
/// use opendoor_reader::traits::PulseInput;
/// use opendoor_reader::error::Result;
///
/// async fn drain<P: PulseInput>(input: &mut P) -> Result<()> {
///     loop {
///         let bit = input.next_pulse().await?;
///         println!("pulse: {bit}");
///     }
/// }
/// ```
pub trait PulseInput: Send {
    /// Wait for the next pulse on either data line.
    ///
    /// Resolves to the bit value of the line that fired: [`Bit::Zero`] for
    /// the D0 line, [`Bit::One`] for D1.
    ///
    /// # Errors
    ///
    /// Returns an error if the pulse source is disconnected. The capture
    /// loop treats that as end-of-input, not as a fault.
    async fn next_pulse(&mut self) -> Result<Bit>;
}
