//! Shared helpers for the daemon test suites.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use camino::Utf8PathBuf;
use rig_config::{Config, DeviceSpec};

use crate::controller::{
    ControllerHandle, ControllerTag, EngineError, RequestEngine, spawn,
};
use crate::health::HealthReporter;

/// Engine driven by a closure, standing in for the Lua binding.
pub(crate) struct FnEngine<F>(pub(crate) F);

impl<F> RequestEngine for FnEngine<F>
where
    F: FnMut(&str, &str) -> Result<Option<String>, EngineError>,
{
    fn invoke(&mut self, handler: &str, payload: &str) -> Result<Option<String>, EngineError> {
        (self.0)(handler, payload)
    }
}

/// Spawns a ready controller around a closure-backed engine.
pub(crate) fn spawn_fn_controller<F>(device: &str, behaviour: F) -> ControllerHandle
where
    F: FnMut(&str, &str) -> Result<Option<String>, EngineError> + Send + 'static,
{
    let tag = Arc::new(ControllerTag::new(device));
    let handle = spawn(tag, move || Ok(FnEngine(behaviour))).expect("spawn controller");
    handle.wait_ready().expect("controller ready");
    handle
}

/// Writes a driver script into the given directory.
pub(crate) fn write_driver(dir: &Path, stem: &str, source: &str) {
    fs::write(dir.join(format!("{stem}.lua")), source).expect("write driver script");
}

/// Builds a configuration rooted at a temporary script directory.
pub(crate) fn config_with_devices(script_dir: &Path, devices: &[(&str, &str)]) -> Config {
    let script_dir = Utf8PathBuf::from_path_buf(script_dir.to_path_buf())
        .expect("temporary path must be UTF-8");
    Config {
        script_dir,
        devices: devices
            .iter()
            .map(|(name, driver)| DeviceSpec::new(*name, *driver))
            .collect(),
        ..Config::default()
    }
}

/// Health reporter that records event labels for assertions.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingReporter {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("recording reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: String) {
        self.events
            .lock()
            .expect("recording reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingReporter {
    fn bootstrap_starting(&self) {
        self.record("bootstrap_starting".to_owned());
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record("bootstrap_succeeded".to_owned());
    }

    fn bootstrap_failed(&self, error: &crate::BootstrapError) {
        self.record(format!("bootstrap_failed: {error}"));
    }

    fn controller_starting(&self, device: &str) {
        self.record(format!("controller_starting: {device}"));
    }

    fn controller_ready(&self, device: &str) {
        self.record(format!("controller_ready: {device}"));
    }

    fn controller_failed(&self, device: &str, error: &crate::controller::ControllerError) {
        self.record(format!("controller_failed: {device}: {error}"));
    }
}
