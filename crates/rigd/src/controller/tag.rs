//! Shared request slot and handshake protocol.
//!
//! One [`ControllerTag`] exists per managed device for the daemon's
//! lifetime. It bundles the device identity with the synchronization
//! state that moves one request from an arbitrary caller thread to the
//! controller thread and one reply back.
//!
//! Two independent phases, by design:
//!
//! 1. **Setup gate** — a one-shot readiness state. The worker flips it to
//!    `Ready` only after its engine is fully constructed, so no caller
//!    can post a request against a half-built engine. Setup failure flips
//!    it to `Failed` instead, which unblocks waiting callers with an
//!    error rather than leaving them parked forever.
//! 2. **Per-request handoff** — a single-slot exchange guarded by one
//!    mutex and three conditions (`request_ready`, `reply_ready`,
//!    `slot_free`). A caller owns the slot from install until it has
//!    consumed the reply; competing callers queue on `slot_free`.
//!
//! Every wait is a predicate-guarded loop, so coalesced or spurious
//! wakeups are harmless.

use std::mem;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::errors::ControllerError;

/// One-shot readiness state of the setup gate.
#[derive(Debug, Clone)]
enum Readiness {
    /// The worker has not finished engine setup.
    Starting,
    /// The controller accepts requests.
    Ready,
    /// Setup failed; the recorded message explains why.
    Failed(String),
}

/// Mutable handoff state shared between the controller and its callers.
#[derive(Debug, Default)]
struct Slot {
    /// A caller owns the slot, from install until reply consumption.
    busy: bool,
    /// Script entry point of the pending request; `Some` iff a request is
    /// pending or executing. Cleared by the worker only after the reply
    /// has been written.
    handler: Option<String>,
    /// Opaque request payload; may be empty.
    request: String,
    /// Reply produced by the worker; empty when the handler yielded no
    /// string result or failed.
    reply: String,
    /// The reply for the current request has been written.
    reply_done: bool,
    /// The installing caller timed out; the worker reclaims the slot when
    /// the execution completes.
    abandoned: bool,
}

/// Bound for a single call, carried alongside its absolute deadline so
/// error reports can name the original timeout.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    timeout: Duration,
}

/// A request taken off the slot by the worker.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    handler: String,
    payload: String,
}

impl PendingRequest {
    /// Script entry point to invoke.
    pub(crate) fn handler(&self) -> &str {
        &self.handler
    }

    /// Opaque request payload.
    pub(crate) fn payload(&self) -> &str {
        &self.payload
    }
}

/// Per-device handoff record: device identity plus the synchronization
/// primitives of the setup gate and the request slot.
#[derive(Debug)]
pub struct ControllerTag {
    device: String,
    init: Mutex<Readiness>,
    init_signal: Condvar,
    handoff: Mutex<Slot>,
    request_ready: Condvar,
    reply_ready: Condvar,
    slot_free: Condvar,
}

impl ControllerTag {
    /// Creates the tag for a device. The identity is immutable afterwards.
    #[must_use]
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            init: Mutex::new(Readiness::Starting),
            init_signal: Condvar::new(),
            handoff: Mutex::new(Slot::default()),
            request_ready: Condvar::new(),
            reply_ready: Condvar::new(),
            slot_free: Condvar::new(),
        }
    }

    /// Identity of the controlled device.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Blocks until the controller is ready.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Startup`] when the worker recorded a
    /// setup failure.
    pub fn wait_ready(&self) -> Result<(), ControllerError> {
        self.wait_ready_inner(None)
    }

    /// Blocks until the controller is ready, for at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Startup`] on a recorded setup failure
    /// and [`ControllerError::Unresponsive`] when the bound elapses
    /// first.
    pub fn wait_ready_timeout(&self, timeout: Duration) -> Result<(), ControllerError> {
        self.wait_ready_inner(Self::deadline(timeout).as_ref())
    }

    /// Posts a request and blocks until its reply is available.
    ///
    /// Requests to one controller are served strictly one at a time,
    /// start to finish. Competing callers queue on the slot; wakeup order
    /// is whatever the platform condition variable provides and is not
    /// guaranteed to be FIFO.
    ///
    /// The reply is the handler's string result, or empty when the
    /// handler produced no string or failed.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Startup`] when the controller never
    /// became ready and [`ControllerError::Internal`] when the shared
    /// state is unusable.
    pub fn call(&self, handler: &str, payload: &str) -> Result<String, ControllerError> {
        self.call_inner(handler, payload, None)
    }

    /// Posts a request with a bound on the total wait.
    ///
    /// The blocking contract of [`ControllerTag::call`] is the default;
    /// this variant adds an upper bound covering readiness, slot
    /// acquisition, and the reply wait together. When the bound elapses
    /// after the request was installed, the slot is marked abandoned and
    /// the worker reclaims it once the in-flight execution completes, so
    /// a later request still succeeds. The abandoned execution itself is
    /// not cancelled.
    ///
    /// # Errors
    ///
    /// As [`ControllerTag::call`], plus [`ControllerError::Unresponsive`]
    /// when the bound elapses.
    pub fn call_with_timeout(
        &self,
        handler: &str,
        payload: &str,
        timeout: Duration,
    ) -> Result<String, ControllerError> {
        self.call_inner(handler, payload, Self::deadline(timeout).as_ref())
    }

    /// True when no request is pending, executing, or awaiting pickup.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.handoff
            .lock()
            .map(|slot| !slot.busy && slot.handler.is_none())
            .unwrap_or(false)
    }

    /// Flips the setup gate to ready. Worker-side; called exactly once,
    /// after engine construction succeeds.
    pub(crate) fn mark_ready(&self) {
        let mut state = match self.init.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *state = Readiness::Ready;
        self.init_signal.notify_all();
    }

    /// Records a fatal setup failure and unblocks waiting callers.
    pub(crate) fn mark_failed(&self, message: impl Into<String>) {
        let mut state = match self.init.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *state = Readiness::Failed(message.into());
        self.init_signal.notify_all();
    }

    /// Blocks until a request is installed and returns a copy of it.
    ///
    /// Worker-side. The handler stays recorded in the slot while the
    /// request executes; [`ControllerTag::complete_request`] clears it.
    pub(crate) fn next_request(&self) -> Result<PendingRequest, ControllerError> {
        let mut slot = self.lock_handoff()?;
        while slot.handler.is_none() {
            slot = self
                .request_ready
                .wait(slot)
                .map_err(|_| self.poisoned())?;
        }
        Ok(PendingRequest {
            handler: slot.handler.clone().unwrap_or_default(),
            payload: slot.request.clone(),
        })
    }

    /// Publishes the reply for the current request and wakes its caller.
    ///
    /// Worker-side. Clears the handler only now, after the reply has been
    /// fully written. When the installing caller abandoned the request,
    /// the slot is reclaimed for the next caller instead.
    pub(crate) fn complete_request(&self, reply: String) -> Result<(), ControllerError> {
        let mut slot = self.lock_handoff()?;
        slot.handler = None;
        if slot.abandoned {
            slot.abandoned = false;
            slot.busy = false;
            slot.reply.clear();
            slot.reply_done = false;
            self.slot_free.notify_one();
        } else {
            slot.reply = reply;
            slot.reply_done = true;
            self.reply_ready.notify_one();
        }
        Ok(())
    }

    fn deadline(timeout: Duration) -> Option<Deadline> {
        Instant::now()
            .checked_add(timeout)
            .map(|at| Deadline { at, timeout })
    }

    fn call_inner(
        &self,
        handler: &str,
        payload: &str,
        deadline: Option<&Deadline>,
    ) -> Result<String, ControllerError> {
        self.wait_ready_inner(deadline)?;

        let mut slot = self.lock_handoff()?;

        while slot.busy {
            let (guard, timed_out) = self.wait_handoff(&self.slot_free, slot, deadline)?;
            slot = guard;
            if timed_out && slot.busy {
                return Err(self.unresponsive(deadline));
            }
        }

        slot.busy = true;
        slot.handler = Some(handler.to_owned());
        slot.request.clear();
        slot.request.push_str(payload);
        slot.reply_done = false;
        self.request_ready.notify_one();

        while !slot.reply_done {
            let (guard, timed_out) = self.wait_handoff(&self.reply_ready, slot, deadline)?;
            slot = guard;
            if timed_out && !slot.reply_done {
                slot.abandoned = true;
                return Err(self.unresponsive(deadline));
            }
        }

        let reply = mem::take(&mut slot.reply);
        slot.reply_done = false;
        slot.busy = false;
        self.slot_free.notify_one();
        Ok(reply)
    }

    fn wait_ready_inner(&self, deadline: Option<&Deadline>) -> Result<(), ControllerError> {
        let mut state = self.init.lock().map_err(|_| self.poisoned())?;
        loop {
            match &*state {
                Readiness::Ready => return Ok(()),
                Readiness::Failed(message) => {
                    return Err(ControllerError::startup(&self.device, message.clone()));
                }
                Readiness::Starting => {}
            }

            let (guard, timed_out) = self.wait_init(state, deadline)?;
            state = guard;
            if timed_out && matches!(&*state, Readiness::Starting) {
                return Err(self.unresponsive(deadline));
            }
        }
    }

    fn wait_init<'a>(
        &self,
        guard: MutexGuard<'a, Readiness>,
        deadline: Option<&Deadline>,
    ) -> Result<(MutexGuard<'a, Readiness>, bool), ControllerError> {
        match deadline {
            None => {
                let guard = self.init_signal.wait(guard).map_err(|_| self.poisoned())?;
                Ok((guard, false))
            }
            Some(deadline) => {
                let remaining = deadline.at.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Ok((guard, true));
                }
                let (guard, result) = self
                    .init_signal
                    .wait_timeout(guard, remaining)
                    .map_err(|_| self.poisoned())?;
                Ok((guard, result.timed_out()))
            }
        }
    }

    fn wait_handoff<'a>(
        &self,
        condvar: &Condvar,
        guard: MutexGuard<'a, Slot>,
        deadline: Option<&Deadline>,
    ) -> Result<(MutexGuard<'a, Slot>, bool), ControllerError> {
        match deadline {
            None => {
                let guard = condvar.wait(guard).map_err(|_| self.poisoned())?;
                Ok((guard, false))
            }
            Some(deadline) => {
                let remaining = deadline.at.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Ok((guard, true));
                }
                let (guard, result) = condvar
                    .wait_timeout(guard, remaining)
                    .map_err(|_| self.poisoned())?;
                Ok((guard, result.timed_out()))
            }
        }
    }

    fn lock_handoff(&self) -> Result<MutexGuard<'_, Slot>, ControllerError> {
        self.handoff.lock().map_err(|_| self.poisoned())
    }

    fn poisoned(&self) -> ControllerError {
        ControllerError::internal(format!(
            "controller '{}' shared state poisoned",
            self.device
        ))
    }

    fn unresponsive(&self, deadline: Option<&Deadline>) -> ControllerError {
        ControllerError::unresponsive(
            &self.device,
            deadline.map(|deadline| deadline.timeout).unwrap_or_default(),
        )
    }
}
