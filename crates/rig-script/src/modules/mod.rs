//! Capability modules shipped with the daemon.

mod codec;
mod host;

pub use codec::CodecModule;
pub use host::HostModule;

use crate::capability::CapabilityModule;

/// The module set every driver environment receives: `rig` host
/// primitives and the `json` codec.
#[must_use]
pub fn standard_modules(device: impl Into<String>) -> Vec<Box<dyn CapabilityModule>> {
    vec![
        Box::new(HostModule::new(device)),
        Box::new(CodecModule::new()),
    ]
}
