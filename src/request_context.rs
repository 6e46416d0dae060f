use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};

use crate::config::Config;
use crate::errors::Error;
use crate::session::{RefreshCoordinator, SessionSignal};

/// Shared context for outbound requests ensuring consistent credential and refresh handling.
#[derive(Clone)]
pub struct RequestDispatchContext {
    http_client: Client,
    base_url: String,
    refresh_url: String,
    expiry_marker: String,
    refresh_timeout: Option<Duration>,
    coordinator: Arc<RefreshCoordinator>,
    signal: SessionSignal,
    refresh_calls: Arc<AtomicU64>,
}

impl RequestDispatchContext {
    pub fn build(config: &Config) -> Result<Self, Error> {
        config.validate()?;
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| Error::Config(format!("Invalid user agent: {}", e)))?,
        );
        if let Some(token) = config.bearer_token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::Config(format!("Invalid bearer token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        // Session credentials travel as cookies; the jar picks up rotated cookies from the
        // refresh response.
        let http_client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()?;
        let base_url = config.normalized_base_url();
        let refresh_url = format!("{}{}", base_url, config.refresh_path);
        Ok(Self {
            http_client,
            base_url,
            refresh_url,
            expiry_marker: config.expiry_marker.clone(),
            refresh_timeout: config.refresh_timeout(),
            coordinator: Arc::new(RefreshCoordinator::new()),
            signal: SessionSignal::new(),
            refresh_calls: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    pub fn refresh_url(&self) -> &str {
        &self.refresh_url
    }

    pub fn expiry_marker(&self) -> &str {
        &self.expiry_marker
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        self.refresh_timeout
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn signal(&self) -> &SessionSignal {
        &self.signal
    }

    pub(crate) fn record_refresh_call(&self) -> u64 {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn refresh_calls(&self) -> u64 {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}
