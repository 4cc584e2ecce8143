//! Interpretation of streamed chat completion records.

use serde::Deserialize;

use crate::relay::{DataRecord, Extracted, SemanticEvent, parse_data_line};

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    message: String,
}

// Only the fields the relay reads. Providers add plenty of others (ids,
// usage, fingerprints) which are ignored.
#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<CompletionChunkChoice>,
    #[serde(default)]
    error: Option<ChunkError>,
}

/// Interpret one line of an upstream completion stream.
///
/// Returns `None` for lines that carry nothing to relay: blank lines,
/// comments, and chunks without delta text (the role preamble, the finish
/// chunk, usage reports).
pub fn extract_event(line: &str) -> Option<Extracted> {
    let data = match parse_data_line(line)? {
        DataRecord::Done => return Some(Extracted::Event(SemanticEvent::Done)),
        DataRecord::Payload(data) => data,
    };

    let chunk = match serde_json::from_str::<CompletionChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::warn!("Parsing completion chunk failed for {}\nError: {}", data, e);
            return Some(Extracted::Malformed(data.to_string()));
        }
    };

    if let Some(error) = chunk.error {
        return Some(Extracted::Event(SemanticEvent::Error(error.message)));
    }

    let content = chunk.choices.into_iter().next()?.delta.content?;
    if content.is_empty() {
        return None;
    }
    Some(Extracted::Event(SemanticEvent::Content(content)))
}
