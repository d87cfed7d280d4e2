//! Daemon bootstrap orchestration.
//!
//! Bootstrap loads the configuration, initialises telemetry, and starts
//! one controller per configured device, waiting on each readiness gate.
//! Any controller that fails to start aborts the bootstrap: the daemon
//! never runs degraded with a subset of its devices.

use std::sync::Arc;

use thiserror::Error;

use rig_config::{Config, ConfigError};

use crate::controller::{
    ControllerError, ControllerHandle, ControllerRegistry, ControllerTag, RegistryError, spawn,
};
use crate::health::HealthReporter;
use crate::script_runtime::script_engine_factory;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when resolution fails.
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load()
    }
}

/// Loader that returns a pre-resolved configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps the configuration to hand out.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// A controller could not be started.
    #[error("failed to start controller '{device}': {source}")]
    Controller {
        /// Device whose controller failed.
        device: String,
        /// Underlying controller error.
        #[source]
        source: ControllerError,
    },
    /// The configuration names the same device twice.
    #[error("invalid device set: {source}")]
    DeviceSet {
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Daemon {
    config: Config,
    registry: ControllerRegistry,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the controller registry.
    #[must_use]
    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    /// Looks up the controller for a device.
    #[must_use]
    pub fn controller(&self, device: &str) -> Option<&ControllerHandle> {
        self.registry.get(device)
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns a [`BootstrapError`] naming the first stage that failed:
/// configuration, telemetry, or a controller startup. All bootstrap
/// failures are fatal; the binary exits on any of them.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let mut registry = ControllerRegistry::new();
    for spec in config.devices() {
        reporter.controller_starting(spec.name());
        let handle = match start_controller(&config, spec) {
            Ok(handle) => handle,
            Err(source) => {
                reporter.controller_failed(spec.name(), &source);
                let error = BootstrapError::Controller {
                    device: spec.name().to_owned(),
                    source,
                };
                reporter.bootstrap_failed(&error);
                return Err(error);
            }
        };
        reporter.controller_ready(spec.name());

        if let Err(source) = registry.register(handle) {
            let error = BootstrapError::DeviceSet { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    }

    reporter.bootstrap_succeeded(&config);
    Ok(Daemon {
        config,
        registry,
        telemetry,
    })
}

/// Spawns one controller and blocks until its readiness gate resolves.
fn start_controller(
    config: &Config,
    spec: &rig_config::DeviceSpec,
) -> Result<ControllerHandle, ControllerError> {
    let tag = Arc::new(ControllerTag::new(spec.name()));
    let handle = spawn(tag, script_engine_factory(config, spec))?;
    handle.wait_ready()?;
    Ok(handle)
}
