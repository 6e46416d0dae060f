use std::sync::Arc;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::SessionInvalidated;

pub const DEFAULT_SIGN_IN_ROUTE: &str = "/login";

/// The signed-in shopper or admin as cached by the application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub signed_in_at: Timestamp,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            signed_in_at: Timestamp::now(),
        }
    }
}

#[derive(Debug, Default)]
struct SessionInner {
    identity: Option<UserIdentity>,
    invalidated_at: Option<Timestamp>,
}

/// Owner of local session state; the single consumer of [`SessionInvalidated`].
#[derive(Clone, Debug)]
pub struct SessionState {
    inner: Arc<RwLock<SessionInner>>,
    sign_in_route: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_sign_in_route(DEFAULT_SIGN_IN_ROUTE)
    }

    pub fn with_sign_in_route(route: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner::default())),
            sign_in_route: route.into(),
        }
    }

    pub async fn sign_in(&self, identity: UserIdentity) {
        let mut inner = self.inner.write().await;
        info!(user_id = %identity.id, "session.sign_in");
        inner.identity = Some(identity);
        inner.invalidated_at = None;
    }

    pub async fn current(&self) -> Option<UserIdentity> {
        self.inner.read().await.identity.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.inner.read().await.identity.is_some()
    }

    pub async fn invalidated_at(&self) -> Option<Timestamp> {
        self.inner.read().await.invalidated_at
    }

    /// Drops the cached identity and records when it happened.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        if let Some(identity) = inner.identity.take() {
            info!(user_id = %identity.id, "session.cleared");
        }
        inner.invalidated_at = Some(Timestamp::now());
    }

    /// Where the application should navigate when no identity is cached.
    pub async fn sign_in_redirect(&self) -> Option<&str> {
        if self.is_signed_in().await {
            None
        } else {
            Some(self.sign_in_route.as_str())
        }
    }

    /// Clears the session every time the client reports an unrecoverable refresh.
    pub fn listen(&self, mut rx: broadcast::Receiver<SessionInvalidated>) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(SessionInvalidated) => state.clear().await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "session listener lagged; clearing session");
                        state.clear().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
