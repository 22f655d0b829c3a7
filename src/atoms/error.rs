// ── Atoms: Error Types ─────────────────────────────────────────────────────
// Single canonical error enum for the gateway, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (I/O, config, WhatsApp client…).
//   • `Client` carries the wrapped client's message unchanged, so HTTP 500
//     bodies show the raw underlying text.
//   • The `#[from]` attribute wires std/external error conversions automatically.

use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EngineError {
    /// Filesystem, socket or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Gateway configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reported by the WhatsApp client (browser launch, page
    /// automation, send/logout). Displayed verbatim.
    #[error("{0}")]
    Client(String),

    /// Catch-all for errors that do not yet have a dedicated variant.
    #[error("{0}")]
    Other(String),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl EngineError {
    /// Create a client error from anything displayable.
    pub fn client(message: impl std::fmt::Display) -> Self {
        Self::Client(message.to_string())
    }
}

// ── String → EngineError ───────────────────────────────────────────────────

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError::Other(s)
    }
}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::Other(s.to_string())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All gateway operations should return this type.
pub type EngineResult<T> = Result<T, EngineError>;
