//! Capability injection into the driver environment.

use mlua::{Lua, Table};

/// A host capability exposed to driver scripts as a named global table.
///
/// Modules are installed once, during engine construction, and remain
/// visible to every handler invocation for the controller's lifetime.
/// Implementations are provided by the surrounding daemon; the engine is
/// agnostic of what the installed functions do.
pub trait CapabilityModule: Send {
    /// Global table name the module is installed under, e.g. `rig`.
    fn name(&self) -> &str;

    /// Populates the module table with host functions.
    ///
    /// # Errors
    ///
    /// Returns the interpreter error when a function or value cannot be
    /// created or assigned.
    fn install(&self, lua: &Lua, table: &Table) -> Result<(), mlua::Error>;
}
