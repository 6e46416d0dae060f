use std::sync::atomic::Ordering;

use storefront_client::{ApiRequest, Error, SessionState, UserIdentity};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

use crate::common::{client, expired, mount_refresh};

#[tokio::test]
async fn failed_refresh_signs_the_user_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(expired())
        .mount(&server)
        .await;
    let refreshes = mount_refresh(&server, 500, 0).await;

    let client = client(&server);
    let session = SessionState::new();
    session
        .sign_in(UserIdentity::new("u-42", "shopper@example.com"))
        .await;
    let listener = session.listen(client.subscribe_invalidations());

    let err = client
        .send(ApiRequest::get("/profile"))
        .await
        .expect_err("refresh failure should surface");
    assert!(matches!(err, Error::RefreshFailed(_)));
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);

    for _ in 0..50 {
        if !session.is_signed_in().await {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(session.current().await.is_none());
    assert_eq!(session.sign_in_redirect().await, Some("/login"));
    listener.abort();
}

#[tokio::test]
async fn successful_refresh_keeps_the_session() {
    let server = MockServer::start().await;
    crate::common::mount_expiring_once(
        &server,
        "GET",
        "/profile",
        serde_json::json!({ "id": "u-7" }),
    )
    .await;
    mount_refresh(&server, 200, 0).await;

    let client = client(&server);
    let session = SessionState::new();
    session
        .sign_in(UserIdentity::new("u-7", "admin@example.com"))
        .await;
    let mut rx = client.subscribe_invalidations();

    client.send(ApiRequest::get("/profile")).await.unwrap();
    assert!(rx.try_recv().is_err());
    assert!(session.is_signed_in().await);
}
