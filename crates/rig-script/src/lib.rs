//! Embedded Lua binding for rigd device drivers.
//!
//! Each controller owns one [`ScriptEngine`]: an isolated `mlua` interpreter
//! loaded with a single device driver chunk. The driver defines its request
//! handlers as global Lua functions; the engine invokes exactly one named
//! handler per request with the request payload as the sole argument and
//! consumes at most one return value.
//!
//! Host capabilities are injected at construction through the
//! [`CapabilityModule`] trait and stay visible to every subsequent handler
//! invocation. The [`standard_modules`] set mirrors what drivers expect:
//! a `rig` table with device/host primitives and a `json` codec table.
//!
//! The engine performs no locking of its own. Callers must guarantee that
//! invocations never overlap; in rigd that guarantee comes from the
//! controller handshake.

mod capability;
mod engine;
mod errors;
mod modules;

pub use capability::CapabilityModule;
pub use engine::ScriptEngine;
pub use errors::ScriptError;
pub use modules::{CodecModule, HostModule, standard_modules};
