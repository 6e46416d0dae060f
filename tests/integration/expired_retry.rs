use std::sync::atomic::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::json;
use storefront_client::{ApiRequest, resource_path};
use wiremock::MockServer;

use crate::common::{client, mount_expiring_once, mount_refresh};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct CartItem {
    product_id: String,
    quantity: u32,
}

#[tokio::test]
async fn five_concurrent_calls_collapse_into_one_refresh() {
    let server = MockServer::start().await;
    let routes = [
        ("GET", "/products"),
        ("GET", "/orders/mine"),
        ("GET", "/wishlist"),
        ("PUT", "/cart"),
        ("GET", "/addresses"),
    ];
    for (http_method, route) in routes {
        mount_expiring_once(&server, http_method, route, json!({ "route": route })).await;
    }
    let refreshes = mount_refresh(&server, 200, 250).await;

    let client = client(&server);
    let handles: Vec<_> = routes
        .iter()
        .map(|(http_method, route)| {
            let client = client.clone();
            let request = match *http_method {
                "PUT" => ApiRequest::put(*route)
                    .with_json(&vec![CartItem {
                        product_id: "p-1".into(),
                        quantity: 2,
                    }])
                    .unwrap(),
                _ => ApiRequest::get(*route),
            };
            tokio::spawn(async move { client.send(request).await })
        })
        .collect();

    for ((_, route), handle) in routes.iter().zip(handles) {
        let resp = handle.await.unwrap().expect("request should be replayed");
        let body: serde_json::Value = resp.json().unwrap();
        assert_eq!(body["route"], *route);
    }
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn typed_helpers_replay_after_refresh() {
    let server = MockServer::start().await;
    let route = resource_path(&["cart", "items"]);
    mount_expiring_once(
        &server,
        "POST",
        &route,
        json!({ "product_id": "p-9", "quantity": 3 }),
    )
    .await;
    let refreshes = mount_refresh(&server, 204, 0).await;

    let client = client(&server);
    let item: CartItem = client
        .post_json(
            &route,
            &CartItem {
                product_id: "p-9".into(),
                quantity: 3,
            },
        )
        .await
        .expect("post should succeed after refresh");
    assert_eq!(item.quantity, 3);
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_threads_still_collapse_into_one_refresh() {
    let server = MockServer::start().await;
    let routes: Vec<String> = (0..20).map(|i| format!("/products/{i}")).collect();
    for route in &routes {
        mount_expiring_once(&server, "GET", route, json!({ "route": route })).await;
    }
    let refreshes = mount_refresh(&server, 200, 250).await;

    let client = client(&server);
    let handles: Vec<_> = routes
        .iter()
        .cloned()
        .map(|route| {
            let client = client.clone();
            tokio::spawn(async move { client.send(ApiRequest::get(route)).await })
        })
        .collect();

    for (route, handle) in routes.iter().zip(handles) {
        let resp = handle.await.unwrap().expect("request should be replayed");
        let body: serde_json::Value = resp.json().unwrap();
        assert_eq!(body["route"], route.as_str());
    }
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(client.refresh_count(), 1);
}
