//! The incremental stream relay: line reassembly, record framing, event
//! extraction and the downstream envelope.

mod encoder;
mod envelope;
mod event;
mod frame;
mod lines;

pub use encoder::{EventStream, STREAM_FAILED, STREAM_STALLED, relay, to_sse_event};
pub use envelope::{RelayRecord, decode_line, encode_record};
pub use event::{Extracted, SemanticEvent};
pub use frame::{DATA_PREFIX, DONE_SENTINEL, DataRecord, parse_data_line};
pub use lines::{LineDecoder, LineStream};
