//! Per-device request dispatch.
//!
//! This module implements the dispatch core of the daemon: a dedicated
//! worker thread per managed device that serializes requests from any
//! number of caller threads into a single-threaded engine and returns
//! each result to the caller that issued it.
//!
//! ## Handoff protocol
//!
//! A caller posts `(handler, payload)` into the device's
//! [`ControllerTag`], wakes the worker, and blocks until the reply is
//! written back into the slot. At most one request is in flight per
//! controller at any time; competing callers queue on the slot. The
//! worker loop is infinite — a controller lives until the process exits.
//!
//! ## Failure policy
//!
//! Environment faults (thread spawn, engine construction) are fatal and
//! surface through [`spawn`] and the readiness gate. Engine runtime
//! failures are recoverable per request: logged, converted to an empty
//! reply, loop continues.

mod engine;
mod errors;
mod handle;
mod registry;
mod tag;
mod worker;

pub use engine::{EngineError, RequestEngine};
pub use errors::ControllerError;
pub use handle::ControllerHandle;
pub use registry::{ControllerRegistry, RegistryError};
pub use tag::ControllerTag;
pub use worker::spawn;
