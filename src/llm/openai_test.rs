use super::*;
use crate::llm::types::Message;

#[test]
fn build_messages_prepends_nonblank_system() {
    let req = ChatRequest::prompt("Draft a notice", 100).with_system("You are a school secretary.");
    let msgs = build_messages(&req);
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0], CcMessage { role: "system", content: "You are a school secretary." });
    assert_eq!(msgs[1], CcMessage { role: "user", content: "Draft a notice" });

    let bare = ChatRequest::prompt("hi", 10).with_system("   ");
    assert_eq!(build_messages(&bare).len(), 1);
}

#[test]
fn build_messages_keeps_turn_order() {
    let mut req = ChatRequest::prompt("first", 10);
    req.messages.push(Message { role: "assistant".into(), content: "second".into() });
    let roles: Vec<&str> = build_messages(&req).iter().map(|m| m.role).collect();
    assert_eq!(roles, vec!["user", "assistant"]);
}

#[test]
fn parse_first_choice_text_and_usage() {
    let json = serde_json::json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": "{\"replies\":[\"Noted.\"]}" }, "finish_reason": "stop" }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20 }
    })
    .to_string();
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text, "{\"replies\":[\"Noted.\"]}");
    assert_eq!(resp.stop_reason, "stop");
    assert_eq!((resp.input_tokens, resp.output_tokens), (12, 8));
}

#[test]
fn parse_null_content_is_empty_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "role": "assistant", "content": null }, "finish_reason": "length" }]
    })
    .to_string();
    assert!(matches!(parse_response(&json), Err(LlmError::EmptyResponse)));
}

#[test]
fn parse_no_choices_is_parse_error() {
    let json = serde_json::json!({ "model": "gpt-4o", "choices": [] }).to_string();
    assert!(matches!(parse_response(&json), Err(LlmError::ApiParse(_))));
}
