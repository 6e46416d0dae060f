mod coordinator;
mod queue;
mod signal;
mod state;

pub use coordinator::{LeaderGuard, RefreshCoordinator, RefreshGeneration, RefreshTicket};
pub use queue::{PendingRequestQueue, RefreshResult};
pub use signal::{SessionInvalidated, SessionSignal};
pub use state::{DEFAULT_SIGN_IN_ROUTE, SessionState, UserIdentity};
