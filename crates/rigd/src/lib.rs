//! Dispatch core of the rigd hardware-control daemon.
//!
//! rigd manages a set of hardware devices, each controlled by a Lua
//! driver script running in its own embedded interpreter. The crate's
//! centre is the [`controller`] module: a dedicated worker thread per
//! device that serializes requests from arbitrary caller threads into
//! the device's engine and hands each reply back to the issuing caller.
//!
//! Around the core sit the daemon concerns: configuration loading
//! (`rig-config`), once-only structured telemetry, health reporting for
//! lifecycle events, and the bootstrap sequence that starts every
//! configured controller and refuses to run degraded.
//!
//! The network listener that produces requests and the command
//! dispatcher that routes them to a device are external collaborators;
//! they reach controllers through the [`controller::ControllerRegistry`]
//! owned by the bootstrapped [`Daemon`].

mod bootstrap;
pub mod controller;
mod health;
mod script_runtime;
mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use script_runtime::{ScriptRuntime, script_engine_factory};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
