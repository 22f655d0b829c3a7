// WhatsApp Session (headless WhatsApp Web)
//
// Module layout:
//   client    — ClientEvent, event channel, WhatsAppClient trait
//   browser   — BrowserClient (headless_chrome), page watcher
//   state     — ConnectionPhase, SessionState, SessionSnapshot
//   relay     — EventRelay (events → state, reconnect on disconnect)
//   reconnect — ReconnectPolicy (bounded exponential backoff)
//   phone     — normalize_recipient
//   qr        — render_terminal_qr

pub mod browser;
pub mod client;
pub mod phone;
pub(crate) mod qr;
pub mod reconnect;
pub mod relay;
pub mod state;

// ── Re-exports ─────────────────────────────────────────────────────────

pub use browser::{BrowserClient, BrowserOptions};
pub use client::{event_channel, ClientEvent, EventReceiver, EventSender, WhatsAppClient};
pub use phone::normalize_recipient;
pub use reconnect::ReconnectPolicy;
pub use relay::EventRelay;
pub use state::{ConnectionPhase, SessionSnapshot, SessionState, SharedSession};
