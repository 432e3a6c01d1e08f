//! Message domain types.
//!
//! These are the value objects the transcript is made of:
//! user types a question → orchestrator appends a user message → the
//! answering service replies → orchestrator appends an assistant message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in the widget transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing into the widget
    User,
    /// The remote answering service (or the widget speaking for it on failure)
    Assistant,
}

/// A document excerpt the answering service cited for its answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Relevant excerpt
    pub content: String,

    /// Source document name
    pub source: String,

    /// Page the excerpt was taken from, when the source is paginated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Relevance score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A single entry in the transcript. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Creation time
    pub timestamp: DateTime<Utc>,

    /// Set only on assistant messages produced from a failed request cycle
    #[serde(default)]
    pub is_error: bool,

    /// Citations returned alongside an answer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceDocument>,
}

impl Message {
    fn new(role: Role, content: String, is_error: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now(),
            is_error,
            sources: Vec::new(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), false)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), false)
    }

    /// Create an assistant message describing a failed request cycle.
    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), true)
    }

    /// Attach citations to this message.
    pub fn with_sources(mut self, sources: Vec<SourceDocument>) -> Self {
        self.sources = sources;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("What does Part A cover?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "What does Part A cover?");
        assert!(!msg.is_error);
        assert!(msg.sources.is_empty());
    }

    #[test]
    fn error_message_is_flagged_assistant() {
        let msg = Message::error("Sorry");
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.is_error);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert!(json.contains("\"role\":\"assistant\""));
        assert!(json.contains("\"is_error\":false"));
        assert!(!json.contains("sources"));
    }

    #[test]
    fn sources_survive_serialization() {
        let msg = Message::assistant("Inpatient care").with_sources(vec![SourceDocument {
            content: "Part A covers...".into(),
            source: "medicare-and-you.pdf".into(),
            page: Some(15),
            score: None,
        }]);
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sources.len(), 1);
        assert_eq!(back.sources[0].page, Some(15));
    }
}
