use std::sync::Arc;

use tokio::sync::oneshot;

use crate::errors::Error;

/// Outcome handed to requests parked behind a refresh. Failures share one `Arc` so every
/// waiter observes the same cause.
pub type RefreshResult = Result<(), Arc<Error>>;

/// Requests that hit an expired session while a refresh was already running.
#[derive(Debug, Default)]
pub struct PendingRequestQueue {
    waiters: Vec<oneshot::Sender<RefreshResult>>,
}

impl PendingRequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks a request; the receiver completes when the in-flight refresh settles.
    pub fn push(&mut self) -> oneshot::Receiver<RefreshResult> {
        let (tx, rx) = oneshot::channel();
        self.waiters.push(tx);
        rx
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    /// Releases every waiter in arrival order and empties the queue.
    pub fn resolve_all(&mut self) -> usize {
        self.settle_all(Ok(()))
    }

    /// Rejects every waiter with the shared cause and empties the queue.
    pub fn reject_all(&mut self, cause: &Arc<Error>) -> usize {
        self.settle_all(Err(Arc::clone(cause)))
    }

    fn settle_all(&mut self, result: RefreshResult) -> usize {
        let drained = self.waiters.len();
        for waiter in self.waiters.drain(..) {
            // A closed receiver means the caller stopped waiting.
            let _ = waiter.send(result.clone());
        }
        drained
    }
}
