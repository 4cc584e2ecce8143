//! Public types for the chat API
use serde_json::Value;
use thiserror::Error;

use crate::openai::{ChatMessage, Role};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Request body must be a JSON object: {0}")]
    Body(String),

    #[error("Messages array is required")]
    MissingMessages,

    #[error(
        "Invalid message format. Each message must have a role (system, user or assistant) and non-empty string content."
    )]
    InvalidMessage { received: Value },
}

impl ValidationError {
    /// The offending message, when there is one to echo back.
    pub fn received(&self) -> Option<&Value> {
        match self {
            ValidationError::InvalidMessage { received } => Some(received),
            ValidationError::Body(_) | ValidationError::MissingMessages => None,
        }
    }
}

/// Validate a chat request body `{ "messages": [{ "role", "content" }, ...] }`.
///
/// Checked by hand rather than through `Deserialize` so a bad message can
/// be echoed back to the caller as it was received.
pub fn parse_messages(body: &Value) -> Result<Vec<ChatMessage>, ValidationError> {
    let messages = body
        .get("messages")
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingMessages)?;

    messages.iter().map(parse_message).collect()
}

fn parse_message(raw: &Value) -> Result<ChatMessage, ValidationError> {
    let invalid = || ValidationError::InvalidMessage {
        received: raw.clone(),
    };

    let role = raw
        .get("role")
        .and_then(Value::as_str)
        .and_then(Role::parse)
        .ok_or_else(invalid)?;
    let content = raw
        .get("content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .ok_or_else(invalid)?;

    Ok(ChatMessage::new(role, content))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_valid_messages() {
        let body = json!({
            "messages": [
                {"role": "user", "content": "price?"},
                {"role": "assistant", "content": "Too high."},
                {"role": "user", "content": "Why?"}
            ]
        });
        let messages = parse_messages(&body).unwrap();
        assert_eq!(
            messages,
            vec![
                ChatMessage::new(Role::User, "price?"),
                ChatMessage::new(Role::Assistant, "Too high."),
                ChatMessage::new(Role::User, "Why?"),
            ]
        );
    }

    #[test]
    fn test_empty_list_is_allowed() {
        assert_eq!(parse_messages(&json!({"messages": []})).unwrap(), vec![]);
    }

    #[test]
    fn test_messages_must_be_an_array() {
        for body in [json!({}), json!({"messages": "hi"}), json!([1, 2])] {
            assert!(matches!(
                parse_messages(&body),
                Err(ValidationError::MissingMessages)
            ));
        }
    }

    #[test]
    fn test_invalid_messages_are_echoed() {
        let cases = [
            json!({"role": "user"}),
            json!({"role": "user", "content": ""}),
            json!({"role": "user", "content": 42}),
            json!({"role": "bot", "content": "hi"}),
            json!({"content": "hi"}),
            json!("hi"),
        ];
        for message in cases {
            let body = json!({"messages": [{"role": "user", "content": "ok"}, message.clone()]});
            let err = parse_messages(&body).unwrap_err();
            assert_eq!(err.received(), Some(&message));
        }
    }
}
