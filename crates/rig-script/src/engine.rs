//! One interpreter instance per controller.

use mlua::{Lua, Value};
use tracing::debug;

use crate::capability::CapabilityModule;
use crate::errors::ScriptError;

const ENGINE_TARGET: &str = "rig_script::engine";

/// Embedded interpreter bound to one device driver.
///
/// The driver chunk runs once at construction and defines its handlers as
/// global functions. [`ScriptEngine::invoke`] then calls one handler per
/// request. The engine holds no locks; the caller must serialize
/// invocations.
pub struct ScriptEngine {
    lua: Lua,
    device: String,
    driver: String,
}

impl std::fmt::Debug for ScriptEngine {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ScriptEngine")
            .field("device", &self.device)
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl ScriptEngine {
    /// Constructs the interpreter, installs the capability modules, and
    /// executes the driver chunk.
    ///
    /// Installation happens before the chunk runs so drivers may call host
    /// functions at load time.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Capability`] when a module cannot be
    /// installed and [`ScriptError::Load`] when the driver chunk fails to
    /// parse or execute. Either failure is unrecoverable for the owning
    /// controller.
    pub fn new(
        device: impl Into<String>,
        driver: impl Into<String>,
        source: &str,
        modules: &[Box<dyn CapabilityModule>],
    ) -> Result<Self, ScriptError> {
        let device = device.into();
        let driver = driver.into();
        let lua = Lua::new();

        for module in modules {
            let table = lua
                .create_table()
                .map_err(|source| ScriptError::capability(module.name(), source))?;
            module
                .install(&lua, &table)
                .map_err(|source| ScriptError::capability(module.name(), source))?;
            lua.globals()
                .set(module.name(), table)
                .map_err(|source| ScriptError::capability(module.name(), source))?;
        }

        lua.load(source)
            .set_name(format!("@{driver}.lua"))
            .exec()
            .map_err(|source| ScriptError::load(&driver, source))?;

        debug!(
            target: ENGINE_TARGET,
            device = %device,
            driver = %driver,
            "driver chunk loaded"
        );

        Ok(Self {
            lua,
            device,
            driver,
        })
    }

    /// Device identity this engine controls.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Driver script stem this engine runs.
    #[must_use]
    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Invokes the named handler with the request payload as its sole
    /// argument.
    ///
    /// Returns `Ok(Some(reply))` when the handler produced a string and
    /// `Ok(None)` when it produced no value or a non-string value; the
    /// caller is expected to normalize `None` to an empty reply.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::UnknownHandler`] when the driver defines no
    /// function under `handler`, and [`ScriptError::Execution`] when the
    /// handler raises a runtime error. Both are recoverable: the engine
    /// stays usable for subsequent requests.
    pub fn invoke(&mut self, handler: &str, payload: &str) -> Result<Option<String>, ScriptError> {
        let slot = self
            .lua
            .globals()
            .get::<Value>(handler)
            .map_err(|source| ScriptError::execution(handler, source))?;

        let Value::Function(function) = slot else {
            return Err(ScriptError::unknown_handler(&self.driver, handler));
        };

        let result = function
            .call::<Value>(payload)
            .map_err(|source| ScriptError::execution(handler, source))?;

        match result {
            Value::String(reply) => Ok(Some(reply.to_string_lossy())),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::standard_modules;

    fn engine(source: &str) -> ScriptEngine {
        ScriptEngine::new("trx0", "testdriver", source, &standard_modules("trx0"))
            .expect("construct engine")
    }

    #[test]
    fn invokes_handler_with_payload() {
        let mut engine = engine(
            r#"
            function set_frequency(data)
                if data == "14074000" then
                    return "OK"
                end
                return "ERR"
            end
            "#,
        );

        let reply = engine.invoke("set_frequency", "14074000").expect("invoke");
        assert_eq!(reply.as_deref(), Some("OK"));
    }

    #[test]
    fn non_string_result_yields_none() {
        let mut engine = engine("function get_mode(data) return 42 end");
        let reply = engine.invoke("get_mode", "").expect("invoke");
        assert_eq!(reply, None);
    }

    #[test]
    fn absent_return_yields_none() {
        let mut engine = engine("function noop(data) end");
        let reply = engine.invoke("noop", "").expect("invoke");
        assert_eq!(reply, None);
    }

    #[test]
    fn unknown_handler_is_reported() {
        let mut engine = engine("function real_handler(data) return data end");
        let error = engine
            .invoke("bogus_handler", "")
            .expect_err("handler must be unknown");
        assert!(matches!(error, ScriptError::UnknownHandler { .. }));
    }

    #[test]
    fn runtime_error_is_reported_and_engine_survives() {
        let mut engine = engine(
            r#"
            function explode(data)
                error("boom")
            end
            function ping(data)
                return "pong"
            end
            "#,
        );

        let error = engine.invoke("explode", "").expect_err("handler must fail");
        assert!(matches!(error, ScriptError::Execution { .. }));

        let reply = engine.invoke("ping", "").expect("subsequent invoke");
        assert_eq!(reply.as_deref(), Some("pong"));
    }

    #[test]
    fn broken_driver_fails_construction() {
        let result = ScriptEngine::new(
            "trx0",
            "broken",
            "function unterminated(",
            &standard_modules("trx0"),
        );
        assert!(matches!(result, Err(ScriptError::Load { .. })));
    }

    #[test]
    fn host_module_is_visible_to_handlers() {
        let mut engine = engine(
            r#"
            function whoami(data)
                return rig.device()
            end
            "#,
        );

        let reply = engine.invoke("whoami", "").expect("invoke");
        assert_eq!(reply.as_deref(), Some("trx0"));
    }

    #[test]
    fn codec_module_round_trips_structured_data() {
        let mut engine = engine(
            r#"
            function report(data)
                local request = json.decode(data)
                return json.encode({ device = rig.device(), band = request.band })
            end
            "#,
        );

        let reply = engine
            .invoke("report", r#"{"band":"20m"}"#)
            .expect("invoke")
            .expect("string reply");
        let decoded: serde_json::Value = serde_json::from_str(&reply).expect("valid json");
        assert_eq!(decoded["device"], "trx0");
        assert_eq!(decoded["band"], "20m");
    }
}
