//! Error types for the controller handoff and lifecycle.
//!
//! Two disjoint classes, mirroring the daemon's failure policy: fatal
//! environment faults (`Spawn`, `Startup`) that the bootstrap path turns
//! into process termination, and per-request faults that surface to one
//! caller while the controller keeps running.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced to callers and the bootstrap path.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The controller thread could not be created.
    #[error("failed to spawn controller thread for '{device}': {source}")]
    Spawn {
        /// Device the controller was meant to serve.
        device: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Engine setup failed; the controller never became ready.
    #[error("controller '{device}' failed to start: {message}")]
    Startup {
        /// Device the controller was meant to serve.
        device: String,
        /// Description recorded by the worker at setup time.
        message: String,
    },

    /// A bounded wait elapsed before the controller produced a reply.
    #[error("controller '{device}' did not respond within {timeout:?}")]
    Unresponsive {
        /// Device the request was addressed to.
        device: String,
        /// The bound that elapsed.
        timeout: Duration,
    },

    /// Cross-thread state became unusable (e.g. a poisoned lock).
    #[error("internal error: {message}")]
    Internal {
        /// Description of the fault.
        message: String,
    },
}

impl ControllerError {
    /// Creates a thread-spawn error.
    pub fn spawn(device: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            device: device.into(),
            source,
        }
    }

    /// Creates a startup error.
    pub fn startup(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Startup {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Creates an unresponsive-controller error.
    pub fn unresponsive(device: impl Into<String>, timeout: Duration) -> Self {
        Self::Unresponsive {
            device: device.into(),
            timeout,
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
