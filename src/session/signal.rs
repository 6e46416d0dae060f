use tokio::sync::broadcast;

const SIGNAL_CAPACITY: usize = 16;

/// Raised once per failed refresh cycle. Carries no payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionInvalidated;

/// Application-wide notification that the session could not be recovered.
#[derive(Debug, Clone)]
pub struct SessionSignal {
    tx: broadcast::Sender<SessionInvalidated>,
}

impl SessionSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionInvalidated> {
        self.tx.subscribe()
    }

    /// Returns the number of listeners notified; zero listeners is not an error.
    pub fn notify(&self) -> usize {
        self.tx.send(SessionInvalidated).unwrap_or(0)
    }

    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new()
    }
}
