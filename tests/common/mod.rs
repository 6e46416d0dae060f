#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use storefront_client::{AuthenticatedClient, Config};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const REFRESH_PATH: &str = "/auth/refresh";

pub fn client(server: &MockServer) -> AuthenticatedClient {
    AuthenticatedClient::new(Config::from_values(server.uri(), None, None, Some(5), None))
        .expect("client builds")
}

pub fn expired() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired", "expired": true }))
}

/// Counts calls to the refresh endpoint and answers each with `status` after `delay_ms`.
pub async fn mount_refresh(server: &MockServer, status: u16, delay_ms: u64) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(move |_req: &Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(status).set_delay(std::time::Duration::from_millis(delay_ms))
        })
        .mount(server)
        .await;
    calls
}

/// First call on `route` (any method) reports an expired session; later calls return `ok_body`.
pub async fn mount_expiring_once(
    server: &MockServer,
    http_method: &str,
    route: &str,
    ok_body: serde_json::Value,
) {
    let calls = Arc::new(AtomicUsize::new(0));
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(move |_req: &Request| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                expired()
            } else {
                ResponseTemplate::new(200).set_body_json(ok_body.clone())
            }
        })
        .mount(server)
        .await;
}
