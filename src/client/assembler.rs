use thiserror::Error;

use super::conversation::{Conversation, FAILURE_NOTICE};
use crate::openai::ChatMessage;
use crate::relay::SemanticEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing in flight, ready for the next submission
    Idle,
    /// Request sent, no response yet
    Sending,
    /// Response accepted and deltas are arriving
    Streaming,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblerError {
    #[error("A message is already in flight")]
    Busy,
    #[error("Message is empty")]
    EmptyMessage,
}

/// Builds the assistant's reply from relayed events.
///
/// Owns the [`Conversation`] and moves through `Idle -> Sending ->
/// Streaming -> Idle` for each exchange. Every method reports whether the
/// conversation or phase changed so the caller knows when to re-render.
#[derive(Debug)]
pub struct MessageAssembler {
    conversation: Conversation,
    phase: Phase,
}

impl Default for MessageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageAssembler {
    pub fn new() -> Self {
        Self {
            conversation: Conversation::new(),
            phase: Phase::Idle,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Start an exchange for `text`.
    ///
    /// Appends the user message and the empty assistant placeholder, then
    /// returns the history to send.
    pub fn submit(&mut self, text: &str) -> Result<Vec<ChatMessage>, AssemblerError> {
        if self.phase != Phase::Idle {
            return Err(AssemblerError::Busy);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(AssemblerError::EmptyMessage);
        }

        self.conversation
            .append_user_message(text)
            .map_err(|_| AssemblerError::Busy)?;
        let history = self.conversation.history();
        self.conversation
            .open_assistant_message()
            .map_err(|_| AssemblerError::Busy)?;
        self.phase = Phase::Sending;
        Ok(history)
    }

    /// The relay accepted the request.
    pub fn response_started(&mut self) -> bool {
        if self.phase == Phase::Sending {
            self.phase = Phase::Streaming;
            return true;
        }
        false
    }

    /// Apply one relayed event. Events arriving after the exchange ended
    /// are ignored.
    pub fn apply(&mut self, event: &SemanticEvent) -> bool {
        if self.phase == Phase::Idle {
            tracing::debug!("Ignoring {:?} outside of an exchange", event);
            return false;
        }
        self.phase = Phase::Streaming;

        match event {
            SemanticEvent::Content(delta) => self.conversation.append_delta(delta).is_ok(),
            SemanticEvent::Done => self.finish(),
            SemanticEvent::Error(message) => {
                tracing::error!("Relay reported an error: {}", message);
                self.fail()
            }
        }
    }

    /// The response ended without a terminal record.
    pub fn stream_ended(&mut self) -> bool {
        if self.phase == Phase::Idle {
            return false;
        }
        self.finish()
    }

    /// The exchange failed. The open message gets the failure notice and
    /// the conversation is ready for another submission.
    pub fn fail(&mut self) -> bool {
        if self.phase == Phase::Idle {
            return false;
        }
        self.phase = Phase::Idle;
        self.conversation
            .fail_assistant_message(FAILURE_NOTICE)
            .is_ok()
    }

    fn finish(&mut self) -> bool {
        self.phase = Phase::Idle;
        self.conversation.close_assistant_message().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::Role;

    fn content(text: &str) -> SemanticEvent {
        SemanticEvent::Content(text.to_string())
    }

    #[test]
    fn test_submit_opens_placeholder_and_returns_history() {
        let mut assembler = MessageAssembler::new();
        let history = assembler.submit("price?").unwrap();

        assert_eq!(history, vec![ChatMessage::new(Role::User, "price?")]);
        assert_eq!(assembler.phase(), Phase::Sending);
        let last = assembler.conversation().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "");
    }

    #[test]
    fn test_submission_rejected_while_in_flight() {
        let mut assembler = MessageAssembler::new();
        assembler.submit("first").unwrap();
        assert_eq!(assembler.submit("second"), Err(AssemblerError::Busy));

        assembler.response_started();
        assert_eq!(assembler.submit("second"), Err(AssemblerError::Busy));
        assert_eq!(assembler.conversation().len(), 2);
    }

    #[test]
    fn test_blank_submission_rejected() {
        let mut assembler = MessageAssembler::new();
        assert_eq!(assembler.submit("   "), Err(AssemblerError::EmptyMessage));
        assert!(assembler.conversation().is_empty());
    }

    #[test]
    fn test_full_exchange() {
        let mut assembler = MessageAssembler::new();
        assembler.submit("price?").unwrap();
        assert!(assembler.response_started());
        assert_eq!(assembler.phase(), Phase::Streaming);

        assert!(assembler.apply(&content("The ")));
        assert!(assembler.apply(&content("price is $100")));
        assert!(assembler.apply(&SemanticEvent::Done));

        assert_eq!(assembler.phase(), Phase::Idle);
        assert_eq!(
            assembler.conversation().last().unwrap().content,
            "The price is $100"
        );
    }

    #[test]
    fn test_nothing_changes_after_done() {
        let mut assembler = MessageAssembler::new();
        assembler.submit("hi").unwrap();
        assembler.apply(&content("hello"));
        assembler.apply(&SemanticEvent::Done);

        assert!(!assembler.apply(&content(" again")));
        assert!(!assembler.apply(&SemanticEvent::Done));
        assert!(!assembler.apply(&SemanticEvent::Error("late".to_string())));
        assert!(!assembler.stream_ended());
        assert_eq!(assembler.conversation().last().unwrap().content, "hello");
    }

    #[test]
    fn test_error_event_after_partial_text() {
        let mut assembler = MessageAssembler::new();
        assembler.submit("hi").unwrap();
        assembler.response_started();
        assembler.apply(&content("The "));
        assert!(assembler.apply(&SemanticEvent::Error(
            "Stream processing failed".to_string()
        )));

        assert_eq!(assembler.phase(), Phase::Idle);
        assert_eq!(
            assembler.conversation().last().unwrap().content,
            format!("The \n{FAILURE_NOTICE}")
        );
    }

    #[test]
    fn test_transport_failure_leaves_conversation_usable() {
        let mut assembler = MessageAssembler::new();
        assembler.submit("hi").unwrap();
        assert!(assembler.fail());
        assert_eq!(
            assembler.conversation().last().unwrap().content,
            FAILURE_NOTICE
        );

        let history = assembler.submit("retry").unwrap();
        assert_eq!(
            history,
            vec![
                ChatMessage::new(Role::User, "hi"),
                ChatMessage::new(Role::User, "retry"),
            ]
        );
    }

    #[test]
    fn test_stream_end_without_done_closes_message() {
        let mut assembler = MessageAssembler::new();
        assembler.submit("hi").unwrap();
        assembler.response_started();
        assembler.apply(&content("partial"));
        assert!(assembler.stream_ended());
        assert_eq!(assembler.phase(), Phase::Idle);
        assert!(!assembler.conversation().is_open());
        assert_eq!(assembler.conversation().last().unwrap().content, "partial");
    }
}
