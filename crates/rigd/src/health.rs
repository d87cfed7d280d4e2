//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;

use rig_config::Config;

use crate::bootstrap::BootstrapError;
use crate::controller::ControllerError;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked before a controller is started.
    fn controller_starting(&self, device: &str);

    /// Invoked once a controller has passed its readiness gate.
    fn controller_ready(&self, device: &str);

    /// Invoked when a controller fails to start.
    fn controller_failed(&self, device: &str, error: &ControllerError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn controller_starting(&self, device: &str) {
        (**self).controller_starting(device);
    }

    fn controller_ready(&self, device: &str) {
        (**self).controller_ready(device);
    }

    fn controller_failed(&self, device: &str, error: &ControllerError) {
        (**self).controller_failed(device, error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "rigd::health",
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "rigd::health",
            event = "bootstrap_succeeded",
            devices = config.devices().len(),
            script_dir = %config.script_dir(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "rigd::health",
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn controller_starting(&self, device: &str) {
        tracing::info!(
            target: "rigd::health",
            event = "controller_starting",
            device = %device,
            "starting controller"
        );
    }

    fn controller_ready(&self, device: &str) {
        tracing::info!(
            target: "rigd::health",
            event = "controller_ready",
            device = %device,
            "controller ready"
        );
    }

    fn controller_failed(&self, device: &str, error: &ControllerError) {
        tracing::error!(
            target: "rigd::health",
            event = "controller_failed",
            device = %device,
            error = %error,
            "controller failed to start"
        );
    }
}
