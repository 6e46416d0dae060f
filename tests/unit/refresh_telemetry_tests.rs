use storefront_client::telemetry::refresh::RefreshTelemetry;

#[test]
fn telemetry_assigns_unique_attempt_ids() {
    let a = RefreshTelemetry::new("session.refresh");
    let b = RefreshTelemetry::new("session.refresh");
    assert_ne!(a.attempt_id(), b.attempt_id());
    assert_eq!(a.context(), "session.refresh");
}
