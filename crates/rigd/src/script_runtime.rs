//! Bridges the controller seam to the Lua driver binding.

use rig_config::{Config, DeviceSpec};
use rig_script::{ScriptEngine, ScriptError, standard_modules};

use crate::controller::{EngineError, RequestEngine};

/// [`RequestEngine`] implementation backed by one [`ScriptEngine`].
#[derive(Debug)]
pub struct ScriptRuntime {
    engine: ScriptEngine,
}

impl ScriptRuntime {
    /// Wraps a constructed engine.
    #[must_use]
    pub fn new(engine: ScriptEngine) -> Self {
        Self { engine }
    }
}

impl From<ScriptError> for EngineError {
    fn from(source: ScriptError) -> Self {
        let message = source.to_string();
        Self::with_source(message, source)
    }
}

impl RequestEngine for ScriptRuntime {
    fn invoke(&mut self, handler: &str, payload: &str) -> Result<Option<String>, EngineError> {
        Ok(self.engine.invoke(handler, payload)?)
    }
}

/// Builds the engine factory for one configured device.
///
/// The returned closure runs on the controller thread, behind the
/// readiness gate: it reads the driver script, installs the standard
/// capability modules, and executes the driver chunk. Any failure —
/// missing script, broken chunk, module installation — is a fatal
/// startup error for that controller.
pub fn script_engine_factory(
    config: &Config,
    spec: &DeviceSpec,
) -> impl FnOnce() -> Result<ScriptRuntime, EngineError> + Send + 'static {
    let device = spec.name().to_owned();
    let driver = spec.driver().to_owned();
    let path = config.driver_path(spec);

    move || {
        let source = std::fs::read_to_string(path.as_std_path()).map_err(|error| {
            EngineError::with_source(format!("failed to read driver script '{path}'"), error)
        })?;
        let modules = standard_modules(&device);
        let engine = ScriptEngine::new(&device, &driver, &source, &modules)?;
        Ok(ScriptRuntime::new(engine))
    }
}
