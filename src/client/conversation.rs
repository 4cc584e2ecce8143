use thiserror::Error;

use crate::openai::{ChatMessage, Role};

/// Shown in place of a reply when the exchange fails.
pub const FAILURE_NOTICE: &str =
    "Sorry, I'm having trouble connecting to my brain right now. Try again in a moment.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("An assistant message is already open")]
    AlreadyOpen,
    #[error("No assistant message is open")]
    NoOpenMessage,
}

#[derive(Debug, Clone)]
struct Entry {
    message: ChatMessage,
    // Failed replies stay visible but are never sent back upstream
    failed: bool,
}

/// The messages of one chat, in the order they were shown.
///
/// At most one assistant message is open at a time and it is always the
/// last one. Only the open message is ever mutated.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    entries: Vec<Entry>,
    open: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.last().map(|e| &e.message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn append_user_message(&mut self, content: &str) -> Result<(), ConversationError> {
        if self.open {
            return Err(ConversationError::AlreadyOpen);
        }
        self.entries.push(Entry {
            message: ChatMessage::new(Role::User, content),
            failed: false,
        });
        Ok(())
    }

    /// Start an empty assistant message that deltas will be appended to.
    pub fn open_assistant_message(&mut self) -> Result<(), ConversationError> {
        if self.open {
            return Err(ConversationError::AlreadyOpen);
        }
        self.entries.push(Entry {
            message: ChatMessage::new(Role::Assistant, ""),
            failed: false,
        });
        self.open = true;
        Ok(())
    }

    pub fn append_delta(&mut self, delta: &str) -> Result<(), ConversationError> {
        self.open_entry()?.message.content.push_str(delta);
        Ok(())
    }

    pub fn close_assistant_message(&mut self) -> Result<(), ConversationError> {
        self.open_entry()?;
        self.open = false;
        Ok(())
    }

    /// Close the open message as failed.
    ///
    /// An empty message is replaced by `notice`. Text that already arrived
    /// is kept and the notice goes on the line after it.
    pub fn fail_assistant_message(&mut self, notice: &str) -> Result<(), ConversationError> {
        let entry = self.open_entry()?;
        let content = &mut entry.message.content;
        if content.is_empty() {
            content.push_str(notice);
        } else {
            content.push('\n');
            content.push_str(notice);
        }
        entry.failed = true;
        self.open = false;
        Ok(())
    }

    /// Messages to send upstream for the next turn.
    ///
    /// Leaves out the open message, failed replies, and empty replies.
    pub fn history(&self) -> Vec<ChatMessage> {
        let settled = if self.open {
            &self.entries[..self.entries.len() - 1]
        } else {
            &self.entries[..]
        };
        settled
            .iter()
            .filter(|e| !e.failed && !e.message.content.is_empty())
            .map(|e| e.message.clone())
            .collect()
    }

    fn open_entry(&mut self) -> Result<&mut Entry, ConversationError> {
        if !self.open {
            return Err(ConversationError::NoOpenMessage);
        }
        self.entries
            .last_mut()
            .ok_or(ConversationError::NoOpenMessage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deltas_go_to_the_open_message() {
        let mut conversation = Conversation::new();
        conversation.append_user_message("price?").unwrap();
        conversation.open_assistant_message().unwrap();
        conversation.append_delta("The ").unwrap();
        conversation.append_delta("price is $100").unwrap();
        conversation.close_assistant_message().unwrap();

        let last = conversation.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "The price is $100");
        assert!(!conversation.is_open());
    }

    #[test]
    fn test_only_one_open_message() {
        let mut conversation = Conversation::new();
        conversation.open_assistant_message().unwrap();
        assert_eq!(
            conversation.open_assistant_message(),
            Err(ConversationError::AlreadyOpen)
        );
        assert_eq!(
            conversation.append_user_message("interrupting"),
            Err(ConversationError::AlreadyOpen)
        );
    }

    #[test]
    fn test_closed_message_rejects_deltas() {
        let mut conversation = Conversation::new();
        conversation.open_assistant_message().unwrap();
        conversation.close_assistant_message().unwrap();
        assert_eq!(
            conversation.append_delta("late"),
            Err(ConversationError::NoOpenMessage)
        );
        assert_eq!(conversation.last().unwrap().content, "");
    }

    #[test]
    fn test_failure_replaces_empty_message() {
        let mut conversation = Conversation::new();
        conversation.open_assistant_message().unwrap();
        conversation.fail_assistant_message(FAILURE_NOTICE).unwrap();
        assert_eq!(conversation.last().unwrap().content, FAILURE_NOTICE);
    }

    #[test]
    fn test_failure_keeps_partial_text() {
        let mut conversation = Conversation::new();
        conversation.open_assistant_message().unwrap();
        conversation.append_delta("The ").unwrap();
        conversation.fail_assistant_message(FAILURE_NOTICE).unwrap();
        assert_eq!(
            conversation.last().unwrap().content,
            format!("The \n{FAILURE_NOTICE}")
        );
    }

    #[test]
    fn test_history_skips_open_failed_and_empty_replies() {
        let mut conversation = Conversation::new();
        conversation.append_user_message("first").unwrap();
        conversation.open_assistant_message().unwrap();
        conversation.fail_assistant_message(FAILURE_NOTICE).unwrap();
        conversation.append_user_message("second").unwrap();
        conversation.open_assistant_message().unwrap();
        conversation.close_assistant_message().unwrap();
        conversation.append_user_message("third").unwrap();
        conversation.open_assistant_message().unwrap();
        conversation.append_delta("answer").unwrap();
        conversation.close_assistant_message().unwrap();
        conversation.append_user_message("fourth").unwrap();
        conversation.open_assistant_message().unwrap();
        conversation.append_delta("streaming").unwrap();

        let history = conversation.history();
        assert_eq!(
            history,
            vec![
                ChatMessage::new(Role::User, "first"),
                ChatMessage::new(Role::User, "second"),
                ChatMessage::new(Role::User, "third"),
                ChatMessage::new(Role::Assistant, "answer"),
                ChatMessage::new(Role::User, "fourth"),
            ]
        );
    }
}
