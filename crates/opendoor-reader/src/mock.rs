//! Mock Wiegand pulse source for testing and development.
//!
//! The mock replays programmatic "swipes" as pulse streams, without any
//! physical reader attached. It comes in two halves connected by a channel:
//! [`MockWiegand`] is the device end the capture loop drains, and
//! [`MockWiegandHandle`] is the controller end tests use to present cards.

use crate::error::{ReaderError, Result};
use crate::traits::PulseInput;
use opendoor_core::Bit;
use opendoor_wiegand::{FormatDescriptor, encode};
use tokio::sync::mpsc;

/// Pulse channel depth. Two full 96-bit frames can sit in flight before a
/// sender has to wait, which no realistic swipe cadence reaches.
const PULSE_CHANNEL_CAPACITY: usize = 192;

/// Mock Wiegand reader line pair.
///
/// # Examples
///
/// ```
/// use opendoor_reader::{MockWiegand, PulseInput};
/// use opendoor_core::Bit;
///
/// #[tokio::main]
/// async fn main() -> opendoor_reader::Result<()> {
///     let (mut input, handle) = MockWiegand::new();
///
///     handle.pulse(Bit::One).await?;
///     handle.pulse(Bit::Zero).await?;
///
///     assert_eq!(input.next_pulse().await?, Bit::One);
///     assert_eq!(input.next_pulse().await?, Bit::Zero);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockWiegand {
    /// Channel receiver for pulses.
    pulse_rx: mpsc::Receiver<Bit>,

    /// Device name.
    name: String,
}

impl MockWiegand {
    /// Create a mock line pair with the default name.
    ///
    /// Returns a tuple of (MockWiegand, MockWiegandHandle) where the handle
    /// is used to simulate swipes.
    pub fn new() -> (Self, MockWiegandHandle) {
        Self::with_name("Mock Wiegand Reader".to_string())
    }

    /// Create a mock line pair with a custom name.
    pub fn with_name(name: String) -> (Self, MockWiegandHandle) {
        let (pulse_tx, pulse_rx) = mpsc::channel(PULSE_CHANNEL_CAPACITY);

        let input = Self {
            pulse_rx,
            name: name.clone(),
        };

        let handle = MockWiegandHandle { pulse_tx, name };

        (input, handle)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PulseInput for MockWiegand {
    async fn next_pulse(&mut self) -> Result<Bit> {
        self.pulse_rx
            .recv()
            .await
            .ok_or_else(|| ReaderError::disconnected(self.name.clone()))
    }
}

/// Handle for driving a mock Wiegand reader.
///
/// # Examples
///
/// ```
/// use opendoor_reader::MockWiegand;
/// use opendoor_wiegand::FormatTable;
///
/// #[tokio::main]
/// async fn main() -> opendoor_reader::Result<()> {
///     let (_input, handle) = MockWiegand::new();
///
///     // Present a 26-bit card by facility code and card number.
///     let desc = FormatTable::builtin().lookup(26).unwrap();
///     handle.swipe_card(desc, 12, 5000).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockWiegandHandle {
    /// Channel sender for pulses.
    pulse_tx: mpsc::Sender<Bit>,

    /// Device name.
    name: String,
}

impl MockWiegandHandle {
    /// Emit a single pulse on one of the data lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader end has been dropped.
    pub async fn pulse(&self, bit: Bit) -> Result<()> {
        self.pulse_tx
            .send(bit)
            .await
            .map_err(|_| ReaderError::disconnected(self.name.clone()))
    }

    /// Replay a frame given as a "0"/"1" string, first bit first.
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::InvalidData` for characters other than '0'/'1'
    /// and `ReaderError::Disconnected` if the reader end has been dropped.
    pub async fn swipe_bits(&self, bits: &str) -> Result<()> {
        for c in bits.chars() {
            let bit = match c {
                '0' => Bit::Zero,
                '1' => Bit::One,
                other => {
                    return Err(ReaderError::invalid_data(format!(
                        "bit string must be 0s and 1s, got '{other}'"
                    )));
                }
            };
            self.pulse(bit).await?;
        }
        Ok(())
    }

    /// Present a card of the given format by facility code and card number.
    ///
    /// The frame is synthesized with correct parity, exactly as a real card
    /// of that format would read.
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::InvalidData` when the fields do not fit the
    /// format and `ReaderError::Disconnected` if the reader end is gone.
    pub async fn swipe_card(
        &self,
        descriptor: &FormatDescriptor,
        facility_code: i64,
        card_number: i64,
    ) -> Result<()> {
        let pulses = encode(descriptor, facility_code, card_number)
            .map_err(|e| ReaderError::invalid_data(e.to_string()))?;
        for bit in pulses {
            self.pulse(bit).await?;
        }
        Ok(())
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendoor_wiegand::FormatTable;

    #[tokio::test]
    async fn test_pulses_arrive_in_order() {
        let (mut input, handle) = MockWiegand::new();

        handle.swipe_bits("101").await.unwrap();

        assert_eq!(input.next_pulse().await.unwrap(), Bit::One);
        assert_eq!(input.next_pulse().await.unwrap(), Bit::Zero);
        assert_eq!(input.next_pulse().await.unwrap(), Bit::One);
    }

    #[tokio::test]
    async fn test_swipe_card_encodes_parity() {
        let (mut input, handle) = MockWiegand::new();
        let desc = FormatTable::builtin().lookup(26).unwrap();

        handle.swipe_card(desc, 12, 5000).await.unwrap();

        let mut bits = String::new();
        for _ in 0..26 {
            bits.push_str(&input.next_pulse().await.unwrap().to_string());
        }
        assert_eq!(bits, "10000110000010011100010001");
    }

    #[tokio::test]
    async fn test_swipe_rejects_bad_bit_string() {
        let (_input, handle) = MockWiegand::new();
        let result = handle.swipe_bits("10x1").await;
        assert!(matches!(result, Err(ReaderError::InvalidData { .. })));
    }

    #[tokio::test]
    async fn test_disconnect_on_dropped_reader() {
        let (input, handle) = MockWiegand::new();
        drop(input);

        let result = handle.pulse(Bit::One).await;
        assert!(matches!(result, Err(ReaderError::Disconnected { .. })));
    }

    #[tokio::test]
    async fn test_disconnect_on_dropped_handle() {
        let (mut input, handle) = MockWiegand::new();
        drop(handle);

        let result = input.next_pulse().await;
        assert!(matches!(result, Err(ReaderError::Disconnected { .. })));
    }

    #[tokio::test]
    async fn test_handle_clone_feeds_same_reader() {
        let (mut input, handle) = MockWiegand::new();
        let clone = handle.clone();

        clone.pulse(Bit::Zero).await.unwrap();
        assert_eq!(input.next_pulse().await.unwrap(), Bit::Zero);
    }
}
