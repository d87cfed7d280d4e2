//! Error types for the script engine binding.

use thiserror::Error;

/// Errors surfaced by the script engine.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The driver chunk failed to load or execute.
    #[error("driver '{driver}' failed to load: {source}")]
    Load {
        /// Driver script stem.
        driver: String,
        /// Underlying interpreter error.
        #[source]
        source: mlua::Error,
    },

    /// A capability module failed to install into the interpreter.
    #[error("capability module '{module}' failed to install: {source}")]
    Capability {
        /// Module name as exposed to scripts.
        module: String,
        /// Underlying interpreter error.
        #[source]
        source: mlua::Error,
    },

    /// The requested handler is not a function in the driver environment.
    #[error("driver '{driver}' defines no handler '{handler}'")]
    UnknownHandler {
        /// Driver script stem.
        driver: String,
        /// Requested handler name.
        handler: String,
    },

    /// Handler execution raised a runtime error.
    #[error("handler '{handler}' failed: {source}")]
    Execution {
        /// Handler that was invoked.
        handler: String,
        /// Underlying interpreter error.
        #[source]
        source: mlua::Error,
    },
}

impl ScriptError {
    /// Creates a load error for the given driver.
    pub(crate) fn load(driver: impl Into<String>, source: mlua::Error) -> Self {
        Self::Load {
            driver: driver.into(),
            source,
        }
    }

    /// Creates a capability installation error.
    pub(crate) fn capability(module: impl Into<String>, source: mlua::Error) -> Self {
        Self::Capability {
            module: module.into(),
            source,
        }
    }

    /// Creates an unknown-handler error.
    pub(crate) fn unknown_handler(driver: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::UnknownHandler {
            driver: driver.into(),
            handler: handler.into(),
        }
    }

    /// Creates a handler execution error.
    pub(crate) fn execution(handler: impl Into<String>, source: mlua::Error) -> Self {
        Self::Execution {
            handler: handler.into(),
            source,
        }
    }
}
