//! Caller-facing handle to a running controller.

use std::sync::Arc;
use std::time::Duration;

use super::errors::ControllerError;
use super::tag::ControllerTag;

/// Clonable handle through which caller threads reach one controller.
///
/// Handles are cheap to clone and share; every clone addresses the same
/// underlying tag. The tag itself lives for the daemon's lifetime.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tag: Arc<ControllerTag>,
}

impl ControllerHandle {
    /// Wraps the tag of a spawned controller.
    pub(crate) fn new(tag: Arc<ControllerTag>) -> Self {
        Self { tag }
    }

    /// Identity of the controlled device.
    #[must_use]
    pub fn device(&self) -> &str {
        self.tag.device()
    }

    /// Blocks until the controller is ready.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Startup`] when the worker recorded a
    /// setup failure.
    pub fn wait_ready(&self) -> Result<(), ControllerError> {
        self.tag.wait_ready()
    }

    /// Blocks until the controller is ready, for at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Startup`] on a recorded setup failure
    /// and [`ControllerError::Unresponsive`] when the bound elapses
    /// first.
    pub fn wait_ready_timeout(&self, timeout: Duration) -> Result<(), ControllerError> {
        self.tag.wait_ready_timeout(timeout)
    }

    /// Posts a request and blocks until its reply is available.
    ///
    /// See [`ControllerTag::call`] for the full contract.
    ///
    /// # Errors
    ///
    /// Propagates the tag-level errors: startup failure or unusable
    /// shared state.
    pub fn call(&self, handler: &str, payload: &str) -> Result<String, ControllerError> {
        self.tag.call(handler, payload)
    }

    /// Posts a request with a bound on the total wait.
    ///
    /// See [`ControllerTag::call_with_timeout`] for the abandonment
    /// semantics.
    ///
    /// # Errors
    ///
    /// As [`ControllerHandle::call`], plus
    /// [`ControllerError::Unresponsive`] when the bound elapses.
    pub fn call_with_timeout(
        &self,
        handler: &str,
        payload: &str,
        timeout: Duration,
    ) -> Result<String, ControllerError> {
        self.tag.call_with_timeout(handler, payload, timeout)
    }

    /// True when no request is pending or executing.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.tag.is_idle()
    }
}
