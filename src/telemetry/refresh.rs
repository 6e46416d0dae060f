use jiff::Timestamp;
use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;

/// Structured events for one session refresh attempt.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    context: String,
}

impl RefreshTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context: context.into(),
        }
    }

    /// Telemetry bound to an attempt already in flight, so parked requests log under the
    /// leader's id.
    pub fn for_attempt(attempt_id: Uuid, context: impl Into<String>) -> Self {
        Self {
            attempt_id,
            context: context.into(),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn emit_start(&self, at: Timestamp) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            "refresh.start"
        );
    }

    pub fn emit_queued(&self, path: &str, depth: usize) {
        event!(
            Level::DEBUG,
            attempt_id = %self.attempt_id,
            context = %self.context,
            path,
            depth,
            "refresh.queued"
        );
    }

    pub fn emit_success(&self, released: usize, at: Timestamp) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            released,
            "refresh.success"
        );
    }

    pub fn emit_failure(&self, error: &Error, rejected: usize, at: Timestamp) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            rejected,
            error = %error,
            "refresh.failure"
        );
    }

    pub fn emit_invalidated(&self, listeners: usize) {
        event!(
            Level::WARN,
            attempt_id = %self.attempt_id,
            context = %self.context,
            listeners,
            "session.invalidated"
        );
    }
}
