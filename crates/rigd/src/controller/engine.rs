//! Seam between the controller worker and the engine implementation.

use std::error::Error;

use thiserror::Error;

/// Executes one named handler per request inside the controller thread.
///
/// Implementations own whatever state the device logic needs (in the
/// daemon, an embedded Lua interpreter). The handshake protocol
/// guarantees invocations never overlap, so implementations require no
/// internal locking. `invoke` returning `Ok(None)` means the handler
/// produced no string result; the worker normalizes that to an empty
/// reply.
pub trait RequestEngine {
    /// Runs the named handler with the request payload as its argument.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when execution fails. The worker treats
    /// this as recoverable: the failure is logged, the caller receives an
    /// empty reply, and the loop continues.
    fn invoke(&mut self, handler: &str, payload: &str) -> Result<Option<String>, EngineError>;
}

/// Error reported by an engine during construction or invocation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
    /// Optional underlying error reported by the engine implementation.
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl EngineError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}
