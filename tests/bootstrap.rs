// Integration test: background initialisation at startup.

use super::{call, json, test_app};
use axum::http::StatusCode;
use ssi_whatsapp_lib::engine::whatsapp::{ClientEvent, ConnectionPhase};
use ssi_whatsapp_lib::spawn_initialize;

#[tokio::test]
async fn init_failure_faults_session_but_keeps_serving() {
    let (app, session, client) = test_app();
    *client.init_error.lock() = Some("Failed to launch Chrome/Chromium".into());

    spawn_initialize(client.clone(), session.clone())
        .await
        .expect("init task does not panic");

    assert_eq!(client.initialize_count(), 1);
    assert_eq!(
        session.phase(),
        ConnectionPhase::Faulted {
            reason: "init error: Failed to launch Chrome/Chromium".into()
        }
    );

    let (status, body) = call(&app, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({ "success": true, "ready": false }));

    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn successful_init_leaves_session_waiting_for_events() {
    let (_app, session, client) = test_app();

    spawn_initialize(client.clone(), session.clone())
        .await
        .expect("init task does not panic");

    assert_eq!(client.initialize_count(), 1);
    assert_eq!(session.phase(), ConnectionPhase::Uninitialized);

    // A later QR still recovers a faulted start.
    session.mark_faulted("init error: transient");
    session.apply(&ClientEvent::Qr("2@retry".into()));
    assert_eq!(session.phase(), ConnectionPhase::Pairing);
}

#[tokio::test(start_paused = true)]
async fn failed_signal_registration_does_not_shut_down() {
    let signal = async { Err(std::io::Error::other("no signal driver")) };
    let waited = tokio::time::timeout(
        std::time::Duration::from_secs(3600),
        ssi_whatsapp_lib::shutdown_on(signal),
    )
    .await;
    assert!(waited.is_err(), "shutdown resolved without a signal");
}

#[tokio::test]
async fn delivered_signal_shuts_down() {
    ssi_whatsapp_lib::shutdown_on(async { Ok(()) }).await;
}
