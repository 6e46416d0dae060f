use reqwest::Method;
use serde_json::json;
use storefront_client::{ApiRequest, Error, resource_path};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn path_and_query_encodes_values() {
    let request = ApiRequest::get("/products")
        .with_query("category", "shoes & bags")
        .with_query("page", "2");
    assert_eq!(
        request.path_and_query(),
        "/products?category=shoes%20%26%20bags&page=2"
    );
}

#[test]
fn resource_path_encodes_segments() {
    assert_eq!(resource_path(&["orders", "A/17"]), "/orders/A%2F17");
}

#[test]
fn constructors_set_method() {
    assert_eq!(ApiRequest::patch("/users/1").method, Method::PATCH);
    assert_eq!(ApiRequest::delete("/users/1").method, Method::DELETE);
    let request = ApiRequest::post("/subscribers").with_body(json!({ "email": "x@y.z" }));
    assert_eq!(request.body, Some(json!({ "email": "x@y.z" })));
}

#[test]
fn relative_path_fails_validation() {
    assert!(matches!(
        ApiRequest::get("orders").validate(),
        Err(Error::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn bearer_token_and_user_agent_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/products/p-1"))
        .and(header("authorization", "Bearer static-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = storefront_client::Config::from_values(
        server.uri(),
        None,
        None,
        None,
        Some("static-token".into()),
    );
    let client = storefront_client::AuthenticatedClient::new(config).unwrap();
    let status = client.delete("/products/p-1").await.unwrap();
    assert_eq!(status.as_u16(), 204);
}
