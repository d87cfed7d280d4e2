//! Process-wide ownership of controller handles.
//!
//! The registry is the single owner of every controller the daemon
//! starts. Collaborators (client handlers, pollers, peer controllers)
//! look handles up by device name; they never hold ambient global state.

use std::collections::HashMap;

use thiserror::Error;

use super::handle::ControllerHandle;

/// Errors surfaced by the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A controller for the device is already registered.
    #[error("controller '{device}' is already registered")]
    Duplicate {
        /// Device name of the rejected registration.
        device: String,
    },
}

/// Registry mapping device names to running controllers.
#[derive(Debug, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, ControllerHandle>,
}

impl ControllerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a running controller under its device name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when a controller already
    /// exists for the device. Exactly one controller per device is an
    /// invariant of the daemon.
    pub fn register(&mut self, handle: ControllerHandle) -> Result<(), RegistryError> {
        let device = handle.device().to_owned();
        if self.controllers.contains_key(&device) {
            return Err(RegistryError::Duplicate { device });
        }
        self.controllers.insert(device, handle);
        Ok(())
    }

    /// Looks up the controller for a device.
    #[must_use]
    pub fn get(&self, device: &str) -> Option<&ControllerHandle> {
        self.controllers.get(device)
    }

    /// Names of all registered devices, in arbitrary order.
    pub fn devices(&self) -> impl Iterator<Item = &str> {
        self.controllers.keys().map(String::as_str)
    }

    /// Number of registered controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// True when no controller is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::engine::{EngineError, RequestEngine};
    use crate::controller::tag::ControllerTag;
    use crate::controller::worker::spawn;
    use std::sync::Arc;

    struct EchoEngine;

    impl RequestEngine for EchoEngine {
        fn invoke(&mut self, _: &str, payload: &str) -> Result<Option<String>, EngineError> {
            Ok(Some(payload.to_owned()))
        }
    }

    fn running_controller(device: &str) -> ControllerHandle {
        let tag = Arc::new(ControllerTag::new(device));
        let handle = spawn(tag, || Ok(EchoEngine)).expect("spawn controller");
        handle.wait_ready().expect("controller ready");
        handle
    }

    #[test]
    fn registers_and_resolves_controllers() {
        let mut registry = ControllerRegistry::new();
        registry
            .register(running_controller("trx0"))
            .expect("register trx0");
        registry
            .register(running_controller("gpio0"))
            .expect("register gpio0");

        assert_eq!(registry.len(), 2);
        let handle = registry.get("trx0").expect("trx0 registered");
        assert_eq!(handle.call("echo", "ping").expect("call"), "ping");
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn rejects_duplicate_devices() {
        let mut registry = ControllerRegistry::new();
        registry
            .register(running_controller("trx0"))
            .expect("register trx0");

        let error = registry
            .register(running_controller("trx0"))
            .expect_err("duplicate must be rejected");
        assert!(matches!(error, RegistryError::Duplicate { .. }));
        assert_eq!(registry.len(), 1);
    }
}
