use super::*;

// =============================================================================
// LlmError
// =============================================================================

#[test]
fn error_codes_are_distinct_per_variant() {
    let codes = [
        LlmError::ConfigParse("bad".into()).error_code(),
        LlmError::MissingApiKey { var: "KEY".into() }.error_code(),
        LlmError::ApiRequest("timeout".into()).error_code(),
        LlmError::ApiResponse { status: 500, body: String::new() }.error_code(),
        LlmError::ApiParse("json".into()).error_code(),
        LlmError::EmptyResponse.error_code(),
        LlmError::HttpClientBuild("tls".into()).error_code(),
    ];
    let mut unique = codes.to_vec();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), codes.len());
    assert_eq!(codes[5], "E_API_EMPTY");
}

#[test]
fn retryable_only_for_transport_throttle_and_server_errors() {
    assert!(LlmError::ApiRequest("conn refused".into()).retryable());
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
    assert!(!LlmError::ApiResponse { status: 401, body: String::new() }.retryable());
    assert!(!LlmError::ApiParse("x".into()).retryable());
    assert!(!LlmError::EmptyResponse.retryable());
}

// =============================================================================
// ChatRequest builders
// =============================================================================

#[test]
fn prompt_builds_single_user_turn() {
    let req = ChatRequest::prompt("hello", 256).with_system("be brief").with_temperature(0.7).json();
    assert_eq!(req.messages, vec![Message::user("hello")]);
    assert_eq!(req.system, "be brief");
    assert_eq!(req.max_tokens, 256);
    assert_eq!(req.temperature, Some(0.7));
    assert_eq!(req.format, ResponseFormat::Json);
}

#[test]
fn join_text_rejects_blank() {
    assert_eq!(join_text(["Hel", "lo"]).unwrap(), "Hello");
    assert!(matches!(join_text(["  ", "\n"]), Err(LlmError::EmptyResponse)));
    assert!(matches!(join_text([]), Err(LlmError::EmptyResponse)));
}
