//! Record framing shared by the upstream provider and the relay.
//!
//! Both legs carry server-sent events where each record of interest is a
//! single `data:` line and the literal `[DONE]` marks the end of a stream.

/// Prefix marking a data record.
pub const DATA_PREFIX: &str = "data:";

/// Payload of the terminal record.
pub const DONE_SENTINEL: &str = "[DONE]";

/// A data record pulled out of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRecord<'a> {
    Done,
    Payload(&'a str),
}

/// Classify a complete line.
///
/// Blank lines, comments (`: keep-alive`), other SSE fields (`event:`,
/// `id:`) and data records with nothing after the prefix yield `None`.
pub fn parse_data_line(line: &str) -> Option<DataRecord<'_>> {
    let data = line.trim().strip_prefix(DATA_PREFIX)?.trim();

    // Data can be empty on keep-alive style records
    if data.is_empty() {
        return None;
    }

    if data == DONE_SENTINEL {
        Some(DataRecord::Done)
    } else {
        Some(DataRecord::Payload(data))
    }
}
