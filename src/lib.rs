// SSI WhatsApp Server
//
// HTTP gateway in front of a headless WhatsApp Web session:
//   atoms/   — constants and the EngineError type
//   engine/  — configuration, WhatsApp client + session state, HTTP routes
//
// Startup order is not synchronised: the listener comes up while the browser
// is still launching, and callers poll /api/status or /api/get-qr.

pub mod atoms;
pub mod engine;

use atoms::error::EngineResult;
use engine::config::GatewayConfig;
use engine::gateway::{self, AppState};
use engine::whatsapp::{
    event_channel, BrowserClient, EventRelay, SessionState, SharedSession, WhatsAppClient,
};
use log::{error, info, warn};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Wire the browser client, event relay and HTTP listener together and
/// serve until `shutdown` resolves. The client is destroyed on the way out.
pub async fn run<F>(config: GatewayConfig, shutdown: F) -> EngineResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (events_tx, events_rx) = event_channel();
    let client: Arc<dyn WhatsAppClient> =
        Arc::new(BrowserClient::new(config.browser_options(), events_tx));
    let session = SessionState::shared();

    let relay = EventRelay::new(session.clone(), client.clone(), config.reconnect.clone());
    tokio::spawn(relay.run(events_rx));

    info!("Initializing WhatsApp engine...");
    spawn_initialize(client.clone(), session.clone());

    let served = gateway::serve(
        &config.listen_addr(),
        AppState::new(session, client.clone()),
        shutdown,
    )
    .await;

    if let Err(e) = client.destroy().await {
        warn!("[whatsapp] Destroy on shutdown failed: {}", e);
    }
    served
}

/// Start the client in the background. A failure is logged and faults the
/// session; the HTTP listener keeps serving either way.
pub fn spawn_initialize(client: Arc<dyn WhatsAppClient>, session: SharedSession) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = client.initialize().await {
            error!("[whatsapp] Init Error: {}", e);
            session.mark_faulted(format!("init error: {}", e));
        }
    })
}

/// Resolve when `signal` fires. If the signal handler cannot be installed
/// the error is logged and this never resolves, so the server keeps running.
pub async fn shutdown_on<S>(signal: S)
where
    S: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            error!("Could not listen for shutdown signal ({}); serving until killed", e);
            std::future::pending::<()>().await;
        }
    }
}
