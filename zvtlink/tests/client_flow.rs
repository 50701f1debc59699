//! End-to-end command flows against a scripted terminal

mod common;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use tokio::sync::mpsc::unbounded_channel;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use zvtlink::{ClientConfig, CommandResponse, CommandState, RegistrationConfig};

use common::connect;

fn config() -> ClientConfig {
    ClientConfig::new(123456)
}

#[tokio::test]
async fn payment_completes_with_events() {
    let (mut client, mut terminal) = connect(config()).await;
    let cancel = CancellationToken::new();

    let intermediate = Arc::new(Mutex::new(Vec::new()));
    let statuses = Arc::new(Mutex::new(Vec::new()));

    let sink = intermediate.clone();
    client
        .events()
        .intermediate_status
        .subscribe(move |text: &String| sink.lock().push(text.clone()));
    let sink = statuses.clone();
    client
        .events()
        .status_information
        .subscribe(move |status| sink.lock().push(status.clone()));

    let (response, _) = tokio::join!(client.payment(Decimal::new(123, 2), &cancel), async {
        let command = terminal.expect().await;
        assert_eq!(
            command.as_ref(),
            &[0x06, 0x01, 0x07, 0x04, 0x00, 0x00, 0x00, 0x00, 0x01, 0x23]
        );
        terminal.acknowledge();

        // Card prompt, transaction status, then completion
        terminal.send(&[0x04, 0xFF, 0x01, 0x0A]);
        terminal.expect_acknowledge().await;
        terminal.send(&[0x04, 0x0F, 0x02, 0x27, 0x00]);
        terminal.expect_acknowledge().await;
        terminal.send(&[0x06, 0x0F, 0x00]);
        terminal.expect_acknowledge().await;
    });

    assert_eq!(response, CommandResponse::successful());
    assert_eq!(intermediate.lock().as_slice(), &["Insert card"]);

    let statuses = statuses.lock();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].result_code, Some(0));

    client.close().await;
}

#[tokio::test]
async fn abort_resolves_with_catalog_text() {
    let (mut client, mut terminal) = connect(config()).await;
    let cancel = CancellationToken::new();

    let (response, _) = tokio::join!(client.payment(Decimal::new(500, 2), &cancel), async {
        terminal.expect().await;
        terminal.acknowledge();
        terminal.send(&[0x06, 0x1E, 0x01, 0x6C]);
        terminal.expect_acknowledge().await;
    });

    assert_eq!(response, CommandResponse::abort("Card not readable"));
    client.close().await;
}

#[tokio::test]
async fn completion_with_embedded_status_fires_event() {
    let (mut client, mut terminal) = connect(config()).await;
    let cancel = CancellationToken::new();

    let statuses = Arc::new(Mutex::new(Vec::new()));
    let sink = statuses.clone();
    client
        .events()
        .status_information
        .subscribe(move |status| sink.lock().push(status.clone()));

    let (response, _) = tokio::join!(client.end_of_day(&cancel), async {
        let command = terminal.expect().await;
        assert_eq!(command.as_ref(), &[0x06, 0x50, 0x03, 0x12, 0x34, 0x56]);
        terminal.acknowledge();
        terminal.send(&[0x06, 0x0F, 0x02, 0x27, 0x00]);
        terminal.expect_acknowledge().await;
    });

    assert_eq!(response, CommandResponse::successful());
    assert_eq!(statuses.lock().len(), 1);
    client.close().await;
}

#[tokio::test]
async fn log_off_resolves_on_ack_then_unsolicited_line_is_dispatched() {
    let (mut client, mut terminal) = connect(config()).await;
    let cancel = CancellationToken::new();

    let (line_tx, mut line_rx) = unbounded_channel();
    client
        .events()
        .line
        .subscribe(move |line| {
            let _ = line_tx.send(line.clone());
        });

    let (response, _) = tokio::join!(client.log_off(&cancel), async {
        assert_eq!(terminal.expect().await.as_ref(), &[0x06, 0x02, 0x00]);
        terminal.acknowledge();
    });
    assert_eq!(response, CommandResponse::successful());

    // No session exists anymore; the print line still reaches subscribers
    terminal.send(&[0x06, 0xD1, 0x05, 0x81, 0x48, 0x65, 0x6C, 0x6C]);
    terminal.expect_acknowledge().await;

    let line = timeout(Duration::from_secs(2), line_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(line.text, "Hell");
    assert!(line.last_line);

    client.close().await;
}

#[tokio::test]
async fn second_command_while_busy_is_rejected() {
    let (mut client, mut terminal) = connect(config()).await;
    let cancel = CancellationToken::new();

    let (response, _) = tokio::join!(client.payment(Decimal::new(100, 2), &cancel), async {
        terminal.expect().await;

        // Payment not yet acknowledged: the slot is taken
        let busy = client.end_of_day(&cancel).await;
        assert_eq!(busy, CommandResponse::error("Busy"));

        terminal.acknowledge();
        terminal.send(&[0x06, 0x0F, 0x00]);
        terminal.expect_acknowledge().await;
    });

    assert_eq!(response, CommandResponse::successful());

    // The slot is free again after resolution
    let (response, _) = tokio::join!(client.diagnosis(&cancel), async {
        terminal.expect().await;
        terminal.acknowledge();
        terminal.send(&[0x06, 0x0F, 0x00]);
        terminal.expect_acknowledge().await;
    });
    assert_eq!(response, CommandResponse::successful());

    client.close().await;
}

#[tokio::test]
async fn silent_terminal_times_out() {
    let config = config().with_command_completion_timeout(Duration::from_millis(100));
    let (mut client, mut terminal) = connect(config).await;
    let cancel = CancellationToken::new();

    let (response, _) = tokio::join!(client.payment(Decimal::new(100, 2), &cancel), async {
        terminal.expect().await;
        terminal.acknowledge();
    });

    assert_eq!(response, CommandResponse::timeout());
    client.close().await;
}

#[tokio::test]
async fn cancellation_after_ack_sends_no_abort() {
    let (mut client, mut terminal) = connect(config()).await;
    let cancel = CancellationToken::new();

    let (response, _) = tokio::join!(client.payment(Decimal::new(100, 2), &cancel), async {
        terminal.expect().await;
        terminal.acknowledge();
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    assert_eq!(response, CommandResponse::error("Cancelled"));

    // Telling the terminal is the caller's move, not ours
    terminal.assert_silent();
    client.close().await;
}

#[tokio::test]
async fn negative_answer_resolves_not_supported() {
    let (mut client, mut terminal) = connect(config()).await;
    let cancel = CancellationToken::new();

    let (response, _) = tokio::join!(client.software_update(&cancel), async {
        assert_eq!(terminal.expect().await.as_ref(), &[0x08, 0x10, 0x00]);
        terminal.send(&[0x84, 0x83, 0x00]);
    });

    assert_eq!(response.state, CommandState::NotSupported);
    client.close().await;
}

#[tokio::test]
async fn registration_announces_tlv_support() {
    let config = config().with_tlv_support(true);
    let (mut client, mut terminal) = connect(config).await;
    let cancel = CancellationToken::new();

    let registration_config = RegistrationConfig::default();
    let (response, _) = tokio::join!(
        client.registration(&registration_config, &cancel),
        async {
            let command = terminal.expect().await;
            assert_eq!(
                command.as_ref(),
                &[
                    0x06, 0x00, 0x10, // registration, 16-byte payload
                    0x12, 0x34, 0x56, // password
                    0x82, // config byte
                    0x09, 0x78, // EUR
                    0x03, 0x00, // service byte
                    0x06, 0x06, 0x26, 0x04, 0x0A, 0x02, 0x06, 0xD3, // permitted commands
                ]
            );
            terminal.acknowledge();
            terminal.send(&[0x06, 0x0F, 0x00]);
            terminal.expect_acknowledge().await;
        }
    );

    assert_eq!(response, CommandResponse::successful());
    client.close().await;
}

#[tokio::test]
async fn intermediate_status_rearms_completion_timer() {
    let config = config().with_command_completion_timeout(Duration::from_millis(150));
    let (mut client, mut terminal) = connect(config).await;
    let cancel = CancellationToken::new();

    let (response, _) = tokio::join!(client.payment(Decimal::new(100, 2), &cancel), async {
        terminal.expect().await;
        terminal.acknowledge();

        // Each prompt lands inside the window; completion arrives well
        // after the original deadline
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            terminal.send(&[0x04, 0xFF, 0x01, 0x0E]);
            terminal.expect_acknowledge().await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        terminal.send(&[0x06, 0x0F, 0x00]);
        terminal.expect_acknowledge().await;
    });

    assert_eq!(response, CommandResponse::successful());
    client.close().await;
}
