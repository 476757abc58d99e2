use super::test_helpers::*;
use crate::models::Severity;

#[tokio::test]
async fn toasts_follow_the_state_bus() {
    let state = test_app_state();
    assert!(!state.cookie_secure);
    assert_eq!(state.toasts.ttl(), TEST_TOAST_TTL);

    state.bus.emit("Hello", "World", Severity::Info);
    let toasts = settled_toasts(&state).await;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Hello");
}

#[tokio::test]
async fn clones_share_repositories_and_toasts() {
    let state = test_app_state().with_secure_cookies(true);
    let clone = state.clone();
    assert!(clone.cookie_secure);

    clone.repos.events.save(&Vec::new()).await.unwrap();
    assert!(state.repos.events.load().await.unwrap().is_empty());

    clone.bus.emit("Shared", "", Severity::Success);
    assert_eq!(settled_toasts(&state).await.len(), 1);
}

#[tokio::test]
async fn mock_llm_records_and_drains() {
    use crate::llm::LlmChat;
    use crate::llm::types::ChatRequest;

    let mock = MockLlm::text("hi");
    let request = ChatRequest::prompt("ping", 16);
    assert_eq!(mock.chat(&request).await.unwrap().text, "hi");
    assert!(mock.chat(&request).await.is_err());
    assert_eq!(mock.requests().len(), 2);
}
