use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use crate::errors::Error;

use super::queue::{PendingRequestQueue, RefreshResult};

/// Snapshot taken when a request is issued, compared against the coordinator when the
/// request later observes an expired session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshGeneration(u64);

#[derive(Debug, Default)]
struct RefreshState {
    refreshing: bool,
    /// Bumped only when a refresh succeeds.
    generation: u64,
    /// Attempt id of the refresh currently in flight.
    attempt_id: Option<Uuid>,
    queue: PendingRequestQueue,
}

/// What a request should do after observing an expired session.
pub enum RefreshTicket {
    /// No refresh running: this request performs it and must settle the guard.
    Leader(LeaderGuard),
    /// A refresh is running: wait for it to settle.
    Follower {
        rx: oneshot::Receiver<RefreshResult>,
        attempt_id: Uuid,
        depth: usize,
    },
    /// A refresh succeeded after this request was issued; replay without refreshing.
    AlreadyRefreshed,
}

/// Single-flight gate around the session refresh call.
///
/// The lock is only held for synchronous check-then-set sections, never across I/O.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Arc<Mutex<RefreshState>>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> RefreshGeneration {
        RefreshGeneration(self.lock().generation)
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Joins the refresh protocol for a request issued at `observed`.
    pub fn enter(&self, observed: RefreshGeneration) -> RefreshTicket {
        let mut state = self.lock();
        if state.refreshing {
            let rx = state.queue.push();
            let depth = state.queue.len();
            let attempt_id = state.attempt_id.unwrap_or_else(Uuid::nil);
            debug!(%attempt_id, depth, "refresh in flight; request parked");
            return RefreshTicket::Follower {
                rx,
                attempt_id,
                depth,
            };
        }
        if state.generation != observed.0 {
            return RefreshTicket::AlreadyRefreshed;
        }
        let attempt_id = Uuid::new_v4();
        state.refreshing = true;
        state.attempt_id = Some(attempt_id);
        RefreshTicket::Leader(LeaderGuard {
            state: Arc::clone(&self.state),
            attempt_id,
            settled: false,
        })
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<RefreshState>) -> MutexGuard<'_, RefreshState> {
    // Critical sections never panic midway, so a poisoned state is still consistent.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Held by the task performing the refresh. Dropping it unsettled rejects every waiter.
pub struct LeaderGuard {
    state: Arc<Mutex<RefreshState>>,
    attempt_id: Uuid,
    settled: bool,
}

impl LeaderGuard {
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    /// Drains the queue with `result` and returns to idle. Returns how many waiters were
    /// released or rejected.
    pub fn settle(mut self, result: RefreshResult) -> usize {
        self.settled = true;
        settle_state(&self.state, result)
    }
}

impl Drop for LeaderGuard {
    fn drop(&mut self) {
        if !self.settled {
            settle_state(&self.state, Err(Arc::new(Error::RefreshAbandoned)));
        }
    }
}

fn settle_state(state: &Mutex<RefreshState>, result: RefreshResult) -> usize {
    let mut state = lock_state(state);
    let drained = match &result {
        Ok(()) => {
            state.generation += 1;
            state.queue.resolve_all()
        }
        Err(cause) => state.queue.reject_all(cause),
    };
    state.attempt_id = None;
    state.refreshing = false;
    drained
}
