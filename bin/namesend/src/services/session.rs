use namesend_models::{TransferState, TransitionResult};
use snafu::Snafu;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

#[derive(Debug, Snafu)]
pub enum SessionError {
    #[snafu(display("A transfer is already in progress ({:?})", state))]
    Busy { state: TransferState },
}

/// Holds the state of the one transfer a session may run at a time.
#[derive(Debug)]
pub struct Session {
    state: Mutex<TransferState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TransferState::Idle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TransferState> {
        // the state is a plain enum, a panic elsewhere cannot leave it torn
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> TransferState {
        *self.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.state().is_in_flight()
    }

    /// Atomically moves the session into `Validating`. Fails while another
    /// run is in flight.
    pub fn begin(self: &Arc<Self>) -> Result<RunGuard, SessionError> {
        let mut state = self.lock();
        if state.transition(TransferState::Validating).is_err() {
            return Err(SessionError::Busy { state: *state });
        }
        Ok(RunGuard {
            session: Arc::clone(self),
        })
    }
}

/// Exclusive handle on a running transfer. Dropping it before a terminal
/// state marks the run `Failed`, so an aborted or panicked run frees the
/// session.
#[derive(Debug)]
pub struct RunGuard {
    session: Arc<Session>,
}

impl RunGuard {
    pub fn state(&self) -> TransferState {
        self.session.state()
    }

    pub fn advance(&self, next: TransferState) -> TransitionResult {
        self.session.lock().transition(next)
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut state = self.session.lock();
        if state.is_in_flight() {
            warn!(state = ?*state, "Transfer run ended without a terminal state");
            *state = TransferState::Failed;
        }
    }
}
