/// A unit of meaning carried by a relayed stream.
///
/// `Done` and `Error` are both terminal: nothing follows either of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticEvent {
    Content(String),
    Done,
    Error(String),
}

impl SemanticEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SemanticEvent::Done | SemanticEvent::Error(_))
    }
}

/// What an extractor made of a single data record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Event(SemanticEvent),
    /// The record could not be interpreted. Holds the raw payload so the
    /// caller can log it before skipping it.
    Malformed(String),
}
