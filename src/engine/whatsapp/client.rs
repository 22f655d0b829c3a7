// WhatsApp — Client Contract
// ClientEvent, event channel aliases, WhatsAppClient trait

use crate::atoms::error::EngineResult;
use async_trait::async_trait;
use tokio::sync::mpsc;

// ── Events ─────────────────────────────────────────────────────────────

/// Lifecycle events emitted by a WhatsApp client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A new pairing payload is waiting to be scanned.
    Qr(String),
    /// The stored or freshly scanned credentials were accepted.
    Authenticated,
    /// The session is connected and able to send messages.
    Ready,
    /// Restoring the stored session failed; a new QR scan is required.
    AuthFailure(String),
    /// The session dropped (remote logout, browser crash, local logout).
    Disconnected(String),
}

pub type EventSender = mpsc::UnboundedSender<ClientEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ClientEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

// ── Client trait ───────────────────────────────────────────────────────

/// The messaging primitives the gateway forwards to. Implementations push
/// `ClientEvent`s into the sender they were built with.
#[async_trait]
pub trait WhatsAppClient: Send + Sync {
    /// Start the session. Returns once the page is loading; readiness is
    /// reported later through events.
    async fn initialize(&self) -> EngineResult<()>;

    /// Tear the session down without touching stored credentials.
    async fn destroy(&self) -> EngineResult<()>;

    /// End the session and discard stored credentials.
    async fn logout(&self) -> EngineResult<()>;

    /// Send `text` to `chat_id` (`<digits>@c.us`).
    async fn send_message(&self, chat_id: &str, text: &str) -> EngineResult<()>;
}
