//! Transcript store — the ordered log a rendering surface draws from.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Append-only sequence of messages, scoped to one widget lifetime.
///
/// Messages are only ever added at the end; the only way to remove anything
/// is [`Transcript::clear`], which drops everything at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message to the end.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The messages in the order they were appended.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn append_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("first"));
        transcript.append(Message::assistant("second"));
        transcript.append(Message::user("third"));

        let contents: Vec<&str> = transcript.all().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
        assert_eq!(transcript.last().map(|m| m.role), Some(Role::User));
    }

    #[test]
    fn clear_empties_everything() {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("hello"));
        transcript.append(Message::assistant("hi"));
        transcript.clear();

        assert!(transcript.is_empty());
        assert!(transcript.last().is_none());
    }

    #[test]
    fn serializes_as_array() {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("hello"));
        let value = serde_json::to_value(&transcript).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["content"], "hello");
    }
}
