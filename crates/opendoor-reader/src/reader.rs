//! The reader polling loop.
//!
//! [`WiegandReader::start`] spawns two tasks: a capture task that drains the
//! pulse input into the shared [`PulseCapture`] (the interrupt-context analog)
//! and a poll task that watches for quiescence, finalizes finished frames,
//! decodes them, and emits [`CardReadEvent`]s on a channel. The returned
//! [`ReaderHandle`] owns the event stream and shuts both tasks down.
//!
//! ```text
//! ┌──────────────┐ pulses  ┌──────────────┐ record  ┌──────────────┐
//! │ PulseInput   │────────►│ capture task │────────►│ PulseCapture │
//! └──────────────┘         └──────────────┘         └──────┬───────┘
//!                                                          │ try_finalize
//!                          ┌──────────────┐  decode  ┌─────┴────────┐
//!        ReaderHandle ◄────│ event mpsc   │◄─────────│  poll task   │
//!                          └──────────────┘          └──────────────┘
//! ```
//!
//! A bad frame never stops the loop: empty captures and decode oddities are
//! logged and the buffer reset (which happens unconditionally each frame
//! cycle) is the only recovery.

use crate::config::ReaderConfig;
use crate::devices::AnyPulseInput;
use crate::traits::PulseInput;
use opendoor_core::{
    CardReadEvent, Error,
    constants::{ACTIVE_POLL_INTERVAL_US, IDLE_POLL_INTERVAL_MS},
};
use opendoor_wiegand::{FormatTable, PulseCapture, decode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Event channel depth. Swipes are human-paced; a handful of buffered reads
/// is already generous.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// One reader channel: configuration plus the format table its decoder
/// consults.
#[derive(Debug)]
pub struct WiegandReader {
    config: ReaderConfig,
    table: FormatTable,
}

impl WiegandReader {
    /// Reader over the built-in format table.
    #[must_use]
    pub fn new(config: ReaderConfig) -> Self {
        Self::with_table(config, FormatTable::builtin().clone())
    }

    /// Reader over a custom format table.
    #[must_use]
    pub fn with_table(config: ReaderConfig, table: FormatTable) -> Self {
        WiegandReader { config, table }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Start the capture and poll tasks against a pulse input.
    ///
    /// Consumes the reader and returns a [`ReaderHandle`] for receiving
    /// decoded card reads. The loop ends on its own when the pulse input
    /// disconnects and the handle's channel drains, or when
    /// [`ReaderHandle::shutdown`] is called.
    #[must_use]
    pub fn start(self, input: AnyPulseInput) -> ReaderHandle {
        let capture = Arc::new(PulseCapture::new(self.config.max_bits));
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let mut tasks = JoinSet::new();

        info!(
            max_bits = self.config.max_bits,
            timeout_ms = self.config.card_read_timeout_ms,
            "wiegand reader starting"
        );

        // Capture task: the interrupt-context analog. Each received pulse is
        // recorded with a single brief lock; nothing else happens here.
        {
            let capture = Arc::clone(&capture);
            let mut input = input;
            tasks.spawn(async move {
                loop {
                    match input.next_pulse().await {
                        Ok(bit) => capture.record(bit),
                        Err(e) => {
                            debug!(error = %e, "pulse input closed");
                            break;
                        }
                    }
                }
            });
        }

        // Poll task: quiescence detection, finalize, decode, emit.
        {
            let timeout = self.config.card_read_timeout();
            let table = self.table;
            tasks.spawn(async move {
                loop {
                    if let Some(snapshot) = capture.try_finalize(timeout) {
                        match decode(&snapshot, &table) {
                            Ok(frame) => {
                                if !frame.parity_ok {
                                    warn!(%frame, hex = %frame.raw_hex, "parity check failed");
                                }
                                info!(%frame, "card swipe detected");
                                if event_tx.send(CardReadEvent::new(frame)).await.is_err() {
                                    debug!("event receiver dropped; reader loop ending");
                                    break;
                                }
                            }
                            Err(Error::EmptyFrame) => {
                                warn!("card read produced no bits; buffer reset");
                            }
                            Err(e) => {
                                warn!(error = %e, "card processing failed; buffer reset");
                            }
                        }
                    }

                    // Spin fast while a frame is arriving, slow while idle.
                    let interval = if capture.pending_bits() > 0 {
                        Duration::from_micros(ACTIVE_POLL_INTERVAL_US)
                    } else {
                        Duration::from_millis(IDLE_POLL_INTERVAL_MS)
                    };
                    tokio::time::sleep(interval).await;
                }
            });
        }

        ReaderHandle { event_rx, tasks }
    }
}

/// Handle for receiving card reads from a running reader.
pub struct ReaderHandle {
    /// Event receiver for decoded card reads.
    event_rx: mpsc::Receiver<CardReadEvent>,

    /// Running capture and poll tasks.
    tasks: JoinSet<()>,
}

impl ReaderHandle {
    /// Receive the next decoded card read.
    ///
    /// Blocks asynchronously until a card is swiped. Returns `None` once the
    /// reader tasks have terminated and the channel has drained.
    pub async fn recv(&mut self) -> Option<CardReadEvent> {
        self.event_rx.recv().await
    }

    /// Abort the reader tasks and wait for them to terminate.
    pub async fn shutdown(mut self) {
        self.tasks.abort_all();
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result
                && !e.is_cancelled()
            {
                warn!(error = %e, "reader task ended abnormally during shutdown");
            }
        }
    }
}
