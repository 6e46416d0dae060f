use storefront_client::retry::Attempt;

#[test]
fn only_original_attempt_may_refresh() {
    assert!(Attempt::Original.may_refresh());
    assert!(!Attempt::Replay.may_refresh());
    assert_eq!(Attempt::Replay.number(), 2);
    assert_eq!(Attempt::Replay.to_string(), "replay");
}
