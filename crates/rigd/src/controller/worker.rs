//! The dedicated controller thread.
//!
//! One worker per device owns that device's engine instance and runs the
//! execution loop: construct the engine, open the readiness gate, then
//! wait–dispatch–reply forever. The loop has no terminal state; process
//! termination is the only exit, which is the intended shape of a
//! long-lived daemon worker.

use std::sync::Arc;
use std::thread;

use tracing::{debug, error, info};

use super::engine::{EngineError, RequestEngine};
use super::handle::ControllerHandle;
use super::tag::ControllerTag;
use crate::controller::errors::ControllerError;

pub(crate) const CONTROLLER_TARGET: &str = "rigd::controller";

/// Starts the controller thread for the given tag.
///
/// The engine is constructed by `factory` on the controller thread
/// itself, behind the readiness gate, so callers can never observe a
/// half-built engine. The thread is detached: it serves requests until
/// the process exits.
///
/// Construction failure inside the thread is fatal to the controller:
/// the gate records the failure and every present and future caller
/// receives [`ControllerError::Startup`]. The bootstrap path treats that
/// as fatal to the daemon.
///
/// # Errors
///
/// Returns [`ControllerError::Spawn`] when the OS refuses to create the
/// thread. This is an unrecoverable environment fault.
pub fn spawn<E, F>(tag: Arc<ControllerTag>, factory: F) -> Result<ControllerHandle, ControllerError>
where
    E: RequestEngine,
    F: FnOnce() -> Result<E, EngineError> + Send + 'static,
{
    let worker_tag = Arc::clone(&tag);
    thread::Builder::new()
        .name(format!("controller-{}", tag.device()))
        .spawn(move || run(&worker_tag, factory))
        .map_err(|source| ControllerError::spawn(tag.device(), source))?;
    Ok(ControllerHandle::new(tag))
}

/// The worker state machine: `STARTING → READY → (WAIT ⇄ EXECUTE) → …`.
fn run<E, F>(tag: &ControllerTag, factory: F)
where
    E: RequestEngine,
    F: FnOnce() -> Result<E, EngineError>,
{
    let mut engine = match factory() {
        Ok(engine) => engine,
        Err(error) => {
            error!(
                target: CONTROLLER_TARGET,
                device = %tag.device(),
                error = %error,
                "engine construction failed"
            );
            tag.mark_failed(error.to_string());
            return;
        }
    };

    tag.mark_ready();
    info!(
        target: CONTROLLER_TARGET,
        device = %tag.device(),
        "controller ready"
    );

    loop {
        let request = match tag.next_request() {
            Ok(request) => request,
            Err(error) => {
                error!(
                    target: CONTROLLER_TARGET,
                    device = %tag.device(),
                    error = %error,
                    "handoff unusable, controller stopping"
                );
                return;
            }
        };

        debug!(
            target: CONTROLLER_TARGET,
            device = %tag.device(),
            handler = %request.handler(),
            "dispatching request"
        );

        let reply = match engine.invoke(request.handler(), request.payload()) {
            Ok(Some(reply)) => reply,
            Ok(None) => String::new(),
            Err(error) => {
                error!(
                    target: CONTROLLER_TARGET,
                    device = %tag.device(),
                    handler = %request.handler(),
                    error = %error,
                    "handler execution failed"
                );
                String::new()
            }
        };

        if let Err(error) = tag.complete_request(reply) {
            error!(
                target: CONTROLLER_TARGET,
                device = %tag.device(),
                error = %error,
                "handoff unusable, controller stopping"
            );
            return;
        }
    }
}
