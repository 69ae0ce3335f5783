//! Demo binary: a scripted tour of the door simulator.
//!
//! Loads the JSON tables from a data directory (default `data/`), starts the
//! reader loop against a mock pulse source, replays a handful of swipes, and
//! prints the virtual panel after each one.
//!
//! ```sh
//! RUST_LOG=info cargo run -p opendoor-emulator -- data
//! ```

use anyhow::Context;
use opendoor_access::{AccessController, EventTable, UserTable};
use opendoor_emulator::{DoorSession, VirtualDisplay};
use opendoor_reader::{AnyPulseInput, MockWiegand, ReaderConfig, ReaderMode, WiegandReader};
use opendoor_wiegand::FormatTable;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Swipes the demo replays: (format bits, facility code, card number).
/// Covers a grant, a deny, a disabled card, and a format with no facility
/// code.
const DEMO_SWIPES: &[(usize, i64, i64)] = &[
    (26, 12, 5000),
    (26, 13, 9999),
    (26, 12, 5001),
    (37, -1, 123_456_789),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let data_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "data".to_string()));

    let config = ReaderConfig::load_or_default(data_dir.join("config.json"));
    let users = UserTable::load(data_dir.join("users.json")).unwrap_or_else(|e| {
        warn!(error = %e, "starting with an empty user table");
        UserTable::default()
    });
    let events = EventTable::load(data_dir.join("events.json")).unwrap_or_else(|e| {
        warn!(error = %e, "starting with an empty event table");
        EventTable::default()
    });

    info!(
        mode = ?config.mode,
        users = users.len(),
        events = events.len(),
        "door simulator starting"
    );

    let controller = AccessController::new(users, events);
    let mut display = VirtualDisplay::default();
    let mut session = DoorSession::new();

    let (input, handle) = MockWiegand::new();
    let mode = config.mode;
    let mut reader = WiegandReader::new(config).start(AnyPulseInput::Mock(input));

    // Script task: replay the demo swipes with a readable pause between
    // them. Each pause is far beyond the quiescence window, so every swipe
    // closes as its own frame.
    let script = tokio::spawn(async move {
        let table = FormatTable::builtin();
        for &(bits, fc, cn) in DEMO_SWIPES {
            tokio::time::sleep(Duration::from_millis(400)).await;
            match table.lookup(bits) {
                Some(desc) => {
                    if let Err(e) = handle.swipe_card(desc, fc, cn).await {
                        warn!(error = %e, "swipe failed");
                        break;
                    }
                }
                None => warn!(bits, "demo swipe references an unknown format"),
            }
        }
    });

    display.show_idle();
    println!("{}\n", display.render());

    for _ in 0..DEMO_SWIPES.len() {
        let Some(event) = reader.recv().await else {
            break;
        };
        match mode {
            ReaderMode::Raw => session.handle_raw(&event, &mut display)?,
            ReaderMode::DoorSim => {
                session
                    .handle_read(&event, &controller, &mut display)
                    .map(|_| ())?;
            }
        }
        println!("{}\n", display.render());
    }

    script.await.context("swipe script panicked")?;
    reader.shutdown().await;

    display.show_idle();
    info!("door simulator finished");
    Ok(())
}
