//! Host primitives exposed to drivers as the `rig` table.

use mlua::{Lua, Table};
use tracing::{debug, error, info, warn};

use crate::capability::CapabilityModule;

const HOST_TARGET: &str = "rig_script::host";

/// Device/host primitives for driver scripts.
///
/// Installed as the global `rig` table:
///
/// - `rig.device()` — identity of the controlled device
/// - `rig.log(level, message)` — forward a record to the daemon's
///   diagnostic channel; unknown levels fall back to `info`
/// - `rig.version()` — daemon version string
#[derive(Debug, Clone)]
pub struct HostModule {
    device: String,
}

impl HostModule {
    /// Creates the module for the given device identity.
    #[must_use]
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

impl CapabilityModule for HostModule {
    fn name(&self) -> &str {
        "rig"
    }

    fn install(&self, lua: &Lua, table: &Table) -> Result<(), mlua::Error> {
        let device = self.device.clone();
        table.set(
            "device",
            lua.create_function(move |_, ()| Ok(device.clone()))?,
        )?;

        let device = self.device.clone();
        table.set(
            "log",
            lua.create_function(move |_, (level, message): (String, String)| {
                match level.to_ascii_lowercase().as_str() {
                    "debug" => debug!(target: HOST_TARGET, device = %device, "{message}"),
                    "warn" => warn!(target: HOST_TARGET, device = %device, "{message}"),
                    "error" => error!(target: HOST_TARGET, device = %device, "{message}"),
                    _ => info!(target: HOST_TARGET, device = %device, "{message}"),
                }
                Ok(())
            })?,
        )?;

        table.set(
            "version",
            lua.create_function(|_, ()| Ok(env!("CARGO_PKG_VERSION")))?,
        )?;

        Ok(())
    }
}
