//! End-to-end reader loop tests: mock pulses in, decoded events out.

use opendoor_reader::{AnyPulseInput, MockWiegand, ReaderConfig, WiegandReader};
use opendoor_wiegand::FormatTable;
use std::time::Duration;
use tokio::time::timeout;

fn test_config() -> ReaderConfig {
    ReaderConfig {
        // Short quiescence window keeps the tests fast; still far above the
        // sub-millisecond pulse spacing of the mock.
        card_read_timeout_ms: 30,
        ..Default::default()
    }
}

#[tokio::test]
async fn swipe_yields_exactly_one_event() {
    let (input, handle) = MockWiegand::new();
    let mut reader = WiegandReader::new(test_config()).start(AnyPulseInput::Mock(input));

    let desc = FormatTable::builtin().lookup(26).unwrap();
    handle.swipe_card(desc, 12, 5000).await.unwrap();

    let event = timeout(Duration::from_secs(2), reader.recv())
        .await
        .expect("reader never emitted an event")
        .expect("reader loop ended early");

    assert_eq!(event.facility_code, 12);
    assert_eq!(event.card_number, 5000);
    assert_eq!(event.frame.name, "STANDARD 26-bit (H10301)");
    assert!(event.frame.parity_ok);
    assert_eq!(event.frame.bits, 26);

    // One swipe, one event: nothing else may arrive.
    let extra = timeout(Duration::from_millis(150), reader.recv()).await;
    assert!(extra.is_err(), "unexpected second event: {extra:?}");

    reader.shutdown().await;
}

#[tokio::test]
async fn consecutive_swipes_yield_separate_events() {
    let (input, handle) = MockWiegand::new();
    let mut reader = WiegandReader::new(test_config()).start(AnyPulseInput::Mock(input));
    let desc = FormatTable::builtin().lookup(26).unwrap();

    handle.swipe_card(desc, 1, 100).await.unwrap();
    let first = timeout(Duration::from_secs(2), reader.recv())
        .await
        .expect("first event missing")
        .expect("reader loop ended early");

    handle.swipe_card(desc, 2, 200).await.unwrap();
    let second = timeout(Duration::from_secs(2), reader.recv())
        .await
        .expect("second event missing")
        .expect("reader loop ended early");

    assert_eq!((first.facility_code, first.card_number), (1, 100));
    assert_eq!((second.facility_code, second.card_number), (2, 200));

    reader.shutdown().await;
}

#[tokio::test]
async fn unknown_format_still_emits_event() {
    let (input, handle) = MockWiegand::new();
    let mut reader = WiegandReader::new(test_config()).start(AnyPulseInput::Mock(input));

    // Ten pulses match no registered format.
    handle.swipe_bits("1100110011").await.unwrap();

    let event = timeout(Duration::from_secs(2), reader.recv())
        .await
        .expect("unknown frame must still be reported")
        .expect("reader loop ended early");

    assert_eq!(event.frame.name, "Unknown");
    assert_eq!(event.facility_code, -1);
    assert_eq!(event.card_number, -1);
    assert_eq!(event.frame.bits, 10);
    assert!(!event.frame.parity_ok);

    reader.shutdown().await;
}

#[tokio::test]
async fn parity_failure_is_reported_not_dropped() {
    let (input, handle) = MockWiegand::new();
    let mut reader = WiegandReader::new(test_config()).start(AnyPulseInput::Mock(input));

    // Valid H10301 frame for FC=12/CN=5000 with the trailing parity flipped.
    handle.swipe_bits("10000110000010011100010000").await.unwrap();

    let event = timeout(Duration::from_secs(2), reader.recv())
        .await
        .expect("corrupted frame must still be reported")
        .expect("reader loop ended early");

    assert!(!event.frame.parity_ok);
    assert_eq!(event.facility_code, 12);
    assert_eq!(event.card_number, 5000);

    reader.shutdown().await;
}

#[tokio::test]
async fn dropping_the_pulse_source_keeps_reader_quiet() {
    let (input, handle) = MockWiegand::new();
    let mut reader = WiegandReader::new(test_config()).start(AnyPulseInput::Mock(input));

    drop(handle);

    // With the input gone and nothing captured, the stream stays silent; the
    // poll task parks on its idle interval until shutdown.
    let quiet = timeout(Duration::from_millis(100), reader.recv()).await;
    assert!(quiet.is_err());

    reader.shutdown().await;
}

#[tokio::test]
async fn overflowing_swipe_is_clamped_to_max_bits() {
    let config = ReaderConfig {
        max_bits: 8,
        card_read_timeout_ms: 30,
        ..Default::default()
    };
    let (input, handle) = MockWiegand::new();
    let mut reader = WiegandReader::new(config).start(AnyPulseInput::Mock(input));

    // Twelve pulses into an eight-bit buffer: four are dropped, the frame
    // still closes by timeout with the first eight.
    handle.swipe_bits("111111110000").await.unwrap();

    let event = timeout(Duration::from_secs(2), reader.recv())
        .await
        .expect("overflowed frame must still close")
        .expect("reader loop ended early");

    assert_eq!(event.frame.bits, 8);
    assert_eq!(event.frame.raw_hex, "0xFF");

    reader.shutdown().await;
}
