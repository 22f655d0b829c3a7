// WhatsApp — Event Relay
// EventRelay: single task that folds client events into SessionState and
// drives reconnects.

use super::client::{ClientEvent, EventReceiver, WhatsAppClient};
use super::qr::render_terminal_qr;
use super::reconnect::ReconnectPolicy;
use super::state::SharedSession;
use log::{error, info, warn};
use std::sync::Arc;

pub struct EventRelay {
    session: SharedSession,
    client: Arc<dyn WhatsAppClient>,
    policy: ReconnectPolicy,
}

impl EventRelay {
    pub fn new(
        session: SharedSession,
        client: Arc<dyn WhatsAppClient>,
        policy: ReconnectPolicy,
    ) -> Self {
        EventRelay { session, client, policy }
    }

    /// Consume events until every sender is dropped.
    pub async fn run(self, mut events: EventReceiver) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        info!("[relay] Event channel closed — relay stopped");
    }

    /// Apply one event. Disconnects are followed by a reconnect before the
    /// next event is looked at.
    pub async fn handle(&self, event: ClientEvent) {
        let phase = self.session.apply(&event);

        match event {
            ClientEvent::Qr(code) => {
                info!("[whatsapp] --- SCAN THE QR CODE BELOW ---");
                match render_terminal_qr(&code) {
                    Ok(rendered) => println!("{}", rendered),
                    Err(e) => warn!("[whatsapp] Could not render QR ({}); raw payload: {}", e, code),
                }
            }
            ClientEvent::Authenticated => {
                info!("[whatsapp] Authenticated");
            }
            ClientEvent::Ready => {
                info!("[whatsapp] SUCCESS: WhatsApp is ONLINE");
            }
            ClientEvent::AuthFailure(msg) => {
                error!("[whatsapp] Authentication failure: {}", msg);
            }
            ClientEvent::Disconnected(reason) => {
                warn!("[whatsapp] Client was logged out: {} (now {})", reason, phase);
                self.reconnect().await;
            }
        }
    }

    /// Destroy and re-initialise the client until it comes back or the
    /// policy runs out. Returns whether initialisation succeeded.
    async fn reconnect(&self) -> bool {
        let mut attempt = 0;
        while let Some(delay) = self.policy.delay_for(attempt) {
            if !delay.is_zero() {
                info!(
                    "[relay] Reconnect attempt {} in {:.1}s",
                    attempt + 1,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }

            if let Err(e) = self.client.destroy().await {
                warn!("[relay] Destroy before reconnect failed: {}", e);
            }

            match self.client.initialize().await {
                Ok(()) => {
                    info!("[relay] Client re-initialized (attempt {})", attempt + 1);
                    return true;
                }
                Err(e) => {
                    warn!("[relay] Re-initialize attempt {} failed: {}", attempt + 1, e);
                }
            }
            attempt += 1;
        }

        if self.policy.max_attempts > 0 {
            error!(
                "[relay] Giving up after {} reconnect attempts — restart required",
                self.policy.max_attempts
            );
            self.session.mark_faulted(format!(
                "reconnect failed after {} attempts",
                self.policy.max_attempts
            ));
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::error::{EngineError, EngineResult};
    use crate::engine::whatsapp::state::{ConnectionPhase, SessionState};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `fail_inits` initialize calls.
    #[derive(Default)]
    struct FlakyClient {
        fail_inits: u32,
        inits: AtomicU32,
        destroys: AtomicU32,
    }

    #[async_trait]
    impl WhatsAppClient for FlakyClient {
        async fn initialize(&self) -> EngineResult<()> {
            let n = self.inits.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_inits {
                Err(EngineError::client("Failed to launch the browser process"))
            } else {
                Ok(())
            }
        }
        async fn destroy(&self) -> EngineResult<()> {
            self.destroys.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn logout(&self) -> EngineResult<()> {
            Ok(())
        }
        async fn send_message(&self, _: &str, _: &str) -> EngineResult<()> {
            Ok(())
        }
    }

    fn relay_with(client: Arc<FlakyClient>, policy: ReconnectPolicy) -> (EventRelay, SharedSession) {
        let session = SessionState::shared();
        (EventRelay::new(session.clone(), client, policy), session)
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_backoff_until_initialize_succeeds() {
        let client = Arc::new(FlakyClient { fail_inits: 2, ..Default::default() });
        let (relay, _session) = relay_with(client.clone(), ReconnectPolicy::default());

        relay.handle(ClientEvent::Disconnected("NAVIGATION".into())).await;

        assert_eq!(client.inits.load(Ordering::SeqCst), 3);
        assert_eq!(client.destroys.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_and_faults_after_max_attempts() {
        let client = Arc::new(FlakyClient { fail_inits: u32::MAX, ..Default::default() });
        let (relay, session) = relay_with(client.clone(), ReconnectPolicy::default());

        relay.handle(ClientEvent::Disconnected("CONFLICT".into())).await;

        assert_eq!(client.inits.load(Ordering::SeqCst), 5);
        assert_eq!(
            session.phase(),
            ConnectionPhase::Faulted { reason: "reconnect failed after 5 attempts".into() }
        );
    }

    #[tokio::test]
    async fn zero_attempts_disables_reconnect() {
        let client = Arc::new(FlakyClient::default());
        let (relay, session) = relay_with(client.clone(), ReconnectPolicy::immediate(0));

        relay.handle(ClientEvent::Disconnected("LOGOUT".into())).await;

        assert_eq!(client.inits.load(Ordering::SeqCst), 0);
        assert_eq!(
            session.phase(),
            ConnectionPhase::Faulted { reason: "disconnected: LOGOUT".into() }
        );
    }

    #[tokio::test]
    async fn auth_failure_does_not_reconnect() {
        let client = Arc::new(FlakyClient::default());
        let (relay, session) = relay_with(client.clone(), ReconnectPolicy::immediate(3));

        relay.handle(ClientEvent::Ready).await;
        relay.handle(ClientEvent::AuthFailure("restore failed".into())).await;

        assert!(!session.is_ready());
        assert_eq!(client.inits.load(Ordering::SeqCst), 0);
        assert_eq!(client.destroys.load(Ordering::SeqCst), 0);
    }
}
