//! Reader configuration.
//!
//! The JSON layout (SCREAMING_SNAKE_CASE keys) matches the `config.json`
//! shipped with the original reader firmware, so deployed files load
//! unchanged. Any unreadable or invalid file falls back to documented
//! defaults with a warning — a reader in the field must come up even when
//! its flash got scrambled.

use crate::error::{ReaderError, Result};
use opendoor_core::constants::{
    DEFAULT_CARD_READ_TIMEOUT_MS, DEFAULT_D0_PIN, DEFAULT_D1_PIN, DEFAULT_MAX_BITS,
    MAX_CONFIG_BITS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Operating mode of the reader loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderMode {
    /// Emit decoded frames only; no access decision.
    Raw,
    /// Decode and run the access decision on every read.
    #[default]
    DoorSim,
}

/// Hardware-facing configuration consumed (not owned) by the capture core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ReaderConfig {
    /// Operating mode.
    pub mode: ReaderMode,

    /// GPIO line carrying "data is 0" pulses.
    pub d0_pin: u8,

    /// GPIO line carrying "data is 1" pulses.
    pub d1_pin: u8,

    /// Capture buffer capacity in bits.
    pub max_bits: usize,

    /// Quiescence window marking end-of-frame, in milliseconds.
    pub card_read_timeout_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            mode: ReaderMode::DoorSim,
            d0_pin: DEFAULT_D0_PIN,
            d1_pin: DEFAULT_D1_PIN,
            max_bits: DEFAULT_MAX_BITS,
            card_read_timeout_ms: DEFAULT_CARD_READ_TIMEOUT_MS,
        }
    }
}

impl ReaderConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// Returns `ReaderError::Io` if the file cannot be read and
    /// `ReaderError::ConfigurationError` if it does not parse or fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: ReaderConfig = serde_json::from_str(&raw).map_err(|e| {
            ReaderError::configuration(format!(
                "invalid config {}: {e}",
                path.as_ref().display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any failure.
    ///
    /// This mirrors the boot behavior of the original firmware: a scrambled
    /// config file produces a warning and a reader running on defaults, not
    /// a dead reader.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "falling back to default reader configuration"
                );
                Self::default()
            }
        }
    }

    /// Check the configuration for values the hardware cannot honor.
    ///
    /// # Errors
    /// Returns `ReaderError::ConfigurationError` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.max_bits == 0 || self.max_bits > MAX_CONFIG_BITS {
            return Err(ReaderError::configuration(format!(
                "MAX_BITS must be 1-{MAX_CONFIG_BITS}, got {}",
                self.max_bits
            )));
        }
        if self.card_read_timeout_ms == 0 {
            return Err(ReaderError::configuration(
                "CARD_READ_TIMEOUT_MS must be non-zero",
            ));
        }
        if self.d0_pin == self.d1_pin {
            return Err(ReaderError::configuration(format!(
                "D0_PIN and D1_PIN must differ, both are {}",
                self.d0_pin
            )));
        }
        Ok(())
    }

    /// The quiescence window as a [`Duration`].
    #[must_use]
    pub fn card_read_timeout(&self) -> Duration {
        Duration::from_millis(self.card_read_timeout_ms)
    }
}
