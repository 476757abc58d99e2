use super::*;
use crate::llm::types::Message;

#[test]
fn request_maps_roles_system_and_json_mode() {
    let mut req = ChatRequest::prompt("Analyze this register", 512)
        .with_system("You advise school principals.")
        .with_temperature(0.8)
        .json();
    req.messages.push(Message { role: "assistant".into(), content: "ok".into() });

    let value = serde_json::to_value(build_request(&req)).unwrap();
    assert_eq!(value["contents"][0]["role"], "user");
    assert_eq!(value["contents"][0]["parts"][0]["text"], "Analyze this register");
    assert_eq!(value["contents"][1]["role"], "model");
    assert_eq!(value["systemInstruction"]["parts"][0]["text"], "You advise school principals.");
    assert!(value["systemInstruction"].get("role").is_none());
    assert_eq!(value["generationConfig"]["maxOutputTokens"], 512);
    assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
}

#[test]
fn text_request_omits_optional_fields() {
    let value = serde_json::to_value(build_request(&ChatRequest::prompt("hi", 64))).unwrap();
    assert!(value.get("systemInstruction").is_none());
    assert!(value["generationConfig"].get("responseMimeType").is_none());
    assert!(value["generationConfig"].get("temperature").is_none());
}

#[test]
fn parse_joins_candidate_parts() {
    let json = serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "[\"Thank you\"," }, { "text": " \"Noted\"]" }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 30, "candidatesTokenCount": 9, "totalTokenCount": 39 },
        "modelVersion": "gemini-2.5-flash-001"
    })
    .to_string();
    let resp = parse_response(&json, "gemini-2.5-flash").unwrap();
    assert_eq!(resp.text, "[\"Thank you\", \"Noted\"]");
    assert_eq!(resp.model, "gemini-2.5-flash-001");
    assert_eq!(resp.stop_reason, "STOP");
    assert_eq!((resp.input_tokens, resp.output_tokens), (30, 9));
}

#[test]
fn parse_blocked_prompt_is_empty_response() {
    let json = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
    assert!(matches!(parse_response(&json, "gemini-2.5-flash"), Err(LlmError::EmptyResponse)));
}

#[test]
fn parse_falls_back_to_requested_model_name() {
    let json = serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": "Hello" }] } }]
    })
    .to_string();
    let resp = parse_response(&json, "gemini-2.5-flash").unwrap();
    assert_eq!(resp.model, "gemini-2.5-flash");
    assert_eq!(resp.stop_reason, "");
}
