use storefront_client::is_expiry_body;

#[test]
fn only_boolean_true_marks_expiry() {
    assert!(is_expiry_body(br#"{"expired":true,"message":"jwt expired"}"#, "expired"));
    assert!(!is_expiry_body(br#"{"expired":false}"#, "expired"));
    assert!(!is_expiry_body(br#"{"expired":1}"#, "expired"));
    assert!(!is_expiry_body(br#"{"message":"invalid credentials"}"#, "expired"));
    assert!(!is_expiry_body(br#"[true]"#, "expired"));
    assert!(!is_expiry_body(b"", "expired"));
}
