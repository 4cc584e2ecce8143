//! The downstream wire envelope and its client-side decoder.
//!
//! Every record the relay sends is an SSE `data:` line holding either a
//! [`RelayRecord`] as JSON or the `[DONE]` sentinel.

use serde::{Deserialize, Serialize};

use super::event::{Extracted, SemanticEvent};
use super::frame::{DONE_SENTINEL, DataRecord, parse_data_line};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayRecord {
    Content { content: String },
    Error { error: String },
}

/// Payload of the data line for an event.
pub fn encode_record(event: &SemanticEvent) -> String {
    let record = match event {
        SemanticEvent::Content(content) => RelayRecord::Content {
            content: content.clone(),
        },
        SemanticEvent::Error(error) => RelayRecord::Error {
            error: error.clone(),
        },
        SemanticEvent::Done => return DONE_SENTINEL.to_string(),
    };
    // Serializing a struct of strings can't fail
    serde_json::to_string(&record).unwrap_or_default()
}

/// Interpret one line of a relay response.
pub fn decode_line(line: &str) -> Option<Extracted> {
    let payload = match parse_data_line(line)? {
        DataRecord::Done => return Some(Extracted::Event(SemanticEvent::Done)),
        DataRecord::Payload(payload) => payload,
    };

    let event = match serde_json::from_str::<RelayRecord>(payload) {
        Ok(RelayRecord::Content { content }) => SemanticEvent::Content(content),
        Ok(RelayRecord::Error { error }) => SemanticEvent::Error(error),
        Err(e) => {
            tracing::warn!("Skipping malformed relay record {}: {}", payload, e);
            return Some(Extracted::Malformed(payload.to_string()));
        }
    };
    Some(Extracted::Event(event))
}
