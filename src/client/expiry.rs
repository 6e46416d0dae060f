use reqwest::StatusCode;

/// How a completed response should be treated by the dispatcher.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ResponseClass {
    Success,
    /// 401 whose body marks the session as expired and refreshable.
    Expired,
    Failed,
}

pub(crate) fn classify(status: StatusCode, body: &[u8], marker: &str) -> ResponseClass {
    if status.is_success() {
        ResponseClass::Success
    } else if status == StatusCode::UNAUTHORIZED && is_expiry_body(body, marker) {
        ResponseClass::Expired
    } else {
        ResponseClass::Failed
    }
}

/// True only when the body is a JSON object whose `marker` field is boolean `true`.
/// Other 401 causes, such as bad credentials, must not trigger a refresh.
pub fn is_expiry_body(body: &[u8], marker: &str) -> bool {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get(marker).and_then(serde_json::Value::as_bool))
        .unwrap_or(false)
}
