use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Non-success response that is not a refreshable session expiry.
    #[error("http {0}: {1}")]
    Http(StatusCode, String),
    /// Expiry reported again after the request already used its single replay.
    #[error("session expired (401) after refresh: {0}")]
    SessionExpired(String),
    /// The refresh call failed. Every request waiting on that refresh shares the same cause.
    #[error("session refresh failed: {0}")]
    RefreshFailed(Arc<Error>),
    /// The task running the refresh stopped before it settled.
    #[error("session refresh abandoned before it settled")]
    RefreshAbandoned,
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// HTTP status carried by the error, when the server produced one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http(status, _) => Some(*status),
            Error::SessionExpired(_) => Some(StatusCode::UNAUTHORIZED),
            Error::Reqwest(err) => err.status(),
            Error::RefreshFailed(cause) => cause.status(),
            _ => None,
        }
    }

    /// True when the session could not be recovered and the caller should sign in again.
    pub fn is_session_failure(&self) -> bool {
        matches!(self, Error::SessionExpired(_) | Error::RefreshFailed(_))
    }

    /// Returns the shared refresh cause when this error came out of a failed refresh.
    pub fn refresh_cause(&self) -> Option<&Arc<Error>> {
        match self {
            Error::RefreshFailed(cause) => Some(cause),
            _ => None,
        }
    }
}
