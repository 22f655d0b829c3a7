// WhatsApp — Session State
// ConnectionPhase, SessionState (ready flag + latest QR), SessionSnapshot

use super::client::ClientEvent;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

// ── Phase ──────────────────────────────────────────────────────────────

/// Connection state machine:
///
/// ```text
/// Uninitialized ──qr──▶ Pairing ──ready──▶ Ready
///       ▲                  ▲                 │
///       │ logout           └──qr── Faulted ◀─┘ auth_failure / disconnected
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionPhase {
    Uninitialized,
    Pairing,
    Ready,
    Faulted { reason: String },
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionPhase::Uninitialized => write!(f, "uninitialized"),
            ConnectionPhase::Pairing => write!(f, "pairing"),
            ConnectionPhase::Ready => write!(f, "ready"),
            ConnectionPhase::Faulted { reason } => write!(f, "faulted ({})", reason),
        }
    }
}

// ── Snapshot ───────────────────────────────────────────────────────────

/// What the HTTP layer sees. `qr` is always `None` while ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub ready: bool,
    pub qr: Option<String>,
}

// ── Shared state ───────────────────────────────────────────────────────

#[derive(Debug)]
struct Inner {
    phase: ConnectionPhase,
    latest_qr: Option<String>,
}

/// Process-wide session state, written by the event relay and read by the
/// HTTP handlers. Nothing here is persisted.
#[derive(Debug)]
pub struct SessionState {
    inner: Mutex<Inner>,
}

pub type SharedSession = Arc<SessionState>;

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        SessionState {
            inner: Mutex::new(Inner {
                phase: ConnectionPhase::Uninitialized,
                latest_qr: None,
            }),
        }
    }

    pub fn shared() -> SharedSession {
        Arc::new(Self::new())
    }

    pub fn is_ready(&self) -> bool {
        self.inner.lock().phase == ConnectionPhase::Ready
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.inner.lock().phase.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock();
        let ready = inner.phase == ConnectionPhase::Ready;
        SessionSnapshot {
            ready,
            qr: if ready { None } else { inner.latest_qr.clone() },
        }
    }

    /// Apply a client event and return the resulting phase.
    pub fn apply(&self, event: &ClientEvent) -> ConnectionPhase {
        let mut inner = self.inner.lock();
        match event {
            ClientEvent::Qr(code) => {
                inner.latest_qr = Some(code.clone());
                inner.phase = ConnectionPhase::Pairing;
            }
            ClientEvent::Authenticated => {}
            ClientEvent::Ready => {
                inner.latest_qr = None;
                inner.phase = ConnectionPhase::Ready;
            }
            ClientEvent::AuthFailure(msg) => {
                inner.phase = ConnectionPhase::Faulted {
                    reason: format!("auth failure: {}", msg),
                };
            }
            ClientEvent::Disconnected(reason) => {
                inner.phase = ConnectionPhase::Faulted {
                    reason: format!("disconnected: {}", reason),
                };
            }
        }
        inner.phase.clone()
    }

    /// Record an initialization or reconnect failure. Leaves the QR alone.
    pub fn mark_faulted(&self, reason: impl Into<String>) {
        self.inner.lock().phase = ConnectionPhase::Faulted {
            reason: reason.into(),
        };
    }

    /// Forget readiness and the pairing payload after a successful logout.
    pub fn reset_after_logout(&self) {
        let mut inner = self.inner.lock();
        inner.phase = ConnectionPhase::Uninitialized;
        inner.latest_qr = None;
    }
}
