use std::time::Duration;

use reqwest::Method;
use tokio::time::Instant;
use tracing::Level;
use tracing::event;

use super::Attempt;

#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub method: Method,
    pub path: String,
    pub attempts: u8,
    pub success: bool,
    pub elapsed: Duration,
    started: Instant,
}

impl RequestOutcome {
    pub fn start(method: &Method, path: &str) -> Self {
        Self {
            method: method.clone(),
            path: path.to_string(),
            attempts: 0,
            success: false,
            elapsed: Duration::ZERO,
            started: Instant::now(),
        }
    }

    pub fn record(&mut self, attempt: Attempt) {
        self.attempts = attempt.number();
    }

    pub fn finish(&mut self, success: bool) {
        self.success = success;
        self.elapsed = self.started.elapsed();
    }

    pub fn log(&self) {
        event!(
            Level::INFO,
            method = %self.method,
            path = %self.path,
            attempts = self.attempts,
            success = self.success,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "request.outcome"
        );
    }
}
