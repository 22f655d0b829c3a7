// Integration test: event relay driving state and reconnects.

use super::{call, json, test_app, MockClient};
use serde_json::json as j;
use ssi_whatsapp_lib::engine::whatsapp::{
    event_channel, ClientEvent, ConnectionPhase, EventRelay, ReconnectPolicy, SessionState,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn disconnect_clears_readiness_and_reinitializes_once() {
    let session = SessionState::shared();
    let client = Arc::new(MockClient::default());
    let relay = EventRelay::new(session.clone(), client.clone(), ReconnectPolicy::default());

    relay.handle(ClientEvent::Ready).await;
    assert!(session.is_ready());

    relay.handle(ClientEvent::Disconnected("NAVIGATION".into())).await;

    assert!(!session.is_ready());
    assert_eq!(client.destroy_count(), 1);
    assert_eq!(client.initialize_count(), 1);
}

#[tokio::test]
async fn relay_task_consumes_channel_in_order() {
    let (app, session, client) = test_app();
    let (tx, rx) = event_channel();
    let relay = EventRelay::new(session.clone(), client.clone(), ReconnectPolicy::immediate(1));
    let task = tokio::spawn(relay.run(rx));

    tx.send(ClientEvent::Qr("ABC123".into())).unwrap();
    tx.send(ClientEvent::Authenticated).unwrap();
    tx.send(ClientEvent::Ready).unwrap();
    drop(tx);
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("relay stops when the channel closes")
        .unwrap();

    let (_, body) = call(&app, "GET", "/api/get-qr", None).await;
    assert_eq!(json(&body), j!({"success": true, "ready": true, "qr": null}));
    assert_eq!(client.initialize_count(), 0);
}

#[tokio::test]
async fn auth_failure_is_terminal_until_a_new_qr() {
    let session = SessionState::shared();
    let client = Arc::new(MockClient::default());
    let relay = EventRelay::new(session.clone(), client.clone(), ReconnectPolicy::default());

    relay.handle(ClientEvent::AuthFailure("stored session could not be restored".into())).await;
    assert!(matches!(session.phase(), ConnectionPhase::Faulted { .. }));
    assert_eq!(client.initialize_count(), 0);

    relay.handle(ClientEvent::Qr("fresh".into())).await;
    assert_eq!(session.phase(), ConnectionPhase::Pairing);
    assert_eq!(session.snapshot().qr.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn reconnected_session_pairs_again() {
    let session = SessionState::shared();
    let client = Arc::new(MockClient::default());
    let relay = EventRelay::new(session.clone(), client.clone(), ReconnectPolicy::default());

    relay.handle(ClientEvent::Ready).await;
    relay.handle(ClientEvent::Disconnected("LOGOUT".into())).await;
    relay.handle(ClientEvent::Qr("second-pairing".into())).await;

    let snapshot = session.snapshot();
    assert!(!snapshot.ready);
    assert_eq!(snapshot.qr.as_deref(), Some("second-pairing"));
}
