//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body};

use pandora::api::AppState;
use pandora::api::app;
use pandora::core::AppConfig;
use pandora::relay::{Extracted, LineDecoder, SemanticEvent, decode_line};

pub fn test_config(api_hostname: &str, api_key: Option<&str>) -> AppConfig {
    AppConfig {
        api_key: api_key.map(String::from),
        api_hostname: api_hostname.to_string(),
        model: String::from("llama-3.3-70b-versatile"),
        system_message: String::from("You are a helpful assistant."),
        temperature: 0.7,
        max_tokens: 1024,
        idle_timeout: Duration::from_secs(5),
    }
}

/// Creates a test application router pointed at `api_hostname` for
/// completions.
pub fn test_app(api_hostname: &str, api_key: Option<&str>) -> Router {
    let app_state =
        AppState::new(test_config(api_hostname, api_key)).expect("Failed to build app state");
    app(Arc::new(app_state))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// Decode a relay response body the way a client would.
pub fn decode_events(body: &str) -> Vec<SemanticEvent> {
    let mut decoder = LineDecoder::new();
    decoder.push(body.as_bytes());
    let mut events = Vec::new();
    while let Some(line) = decoder.next_line() {
        if let Some(Extracted::Event(event)) = decode_line(&line) {
            events.push(event);
        }
    }
    events
}

/// One streamed completion chunk in the provider's format.
pub fn completion_chunk(content: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1234567890,
            "model": "llama-3.3-70b-versatile",
            "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
        })
    )
}
