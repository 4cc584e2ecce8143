//! OpenAI compatible chat completions: the upstream leg of the relay.

mod core;
mod stream;

pub use self::core::{
    ByteStream, ChatMessage, CompletionRequest, Role, UpstreamClient, UpstreamError,
};
pub use stream::extract_event;
