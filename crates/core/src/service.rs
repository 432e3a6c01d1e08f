//! Answering service trait — the abstraction over the remote question/answer
//! backend the widget talks to.
//!
//! The wire contract is small: `POST <endpoint>/query` with
//! `{"conversation_id", "question"}`, answered by a JSON object carrying the
//! answer text under one of [`ANSWER_FIELDS`]. Anything the widget cannot
//! make sense of in a successful response degrades to a placeholder answer
//! rather than an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServiceError;
use crate::identity::ConversationId;
use crate::message::SourceDocument;

/// Response keys that may carry the answer text, in priority order.
pub const ANSWER_FIELDS: [&str; 3] = ["response", "answer", "message"];

/// Answer text used when a successful response carries none of the
/// accepted fields.
pub const PLACEHOLDER_ANSWER: &str = "No response received";

/// Wording of the message appended when every attempt fails; `{error}` is
/// replaced by the failure description.
pub const DEFAULT_ERROR_TEMPLATE: &str =
    "Sorry, I encountered an error: {error}. Please try again later.";

/// Body of a query request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub conversation_id: ConversationId,
    pub question: String,
}

impl QueryRequest {
    pub fn new(conversation_id: ConversationId, question: impl Into<String>) -> Self {
        Self {
            conversation_id,
            question: question.into(),
        }
    }
}

/// What a successful attempt resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SourceDocument>,
}

impl Answer {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// Body of `GET <endpoint>/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub vector_store_loaded: bool,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// How an answer is pulled out of a response body.
///
/// Field names are consulted in order and the first one holding a usable
/// value wins. Numbers and `true` are shown as text; empty strings, zero,
/// `false`, `null`, arrays and objects count as absent. `sources` is read
/// opportunistically; a malformed list is dropped, not reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseContract {
    answer_fields: Vec<String>,
    placeholder: String,
}

impl ResponseContract {
    pub fn new(answer_fields: Vec<String>, placeholder: impl Into<String>) -> Self {
        Self {
            answer_fields,
            placeholder: placeholder.into(),
        }
    }

    /// Extract an answer from a raw response body.
    pub fn extract(&self, body: &[u8]) -> Answer {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => self.extract_value(&value),
            Err(e) => {
                tracing::debug!(error = %e, "Response body is not JSON, using placeholder");
                Answer::text(&self.placeholder)
            }
        }
    }

    /// Extract an answer from an already-parsed response.
    pub fn extract_value(&self, value: &Value) -> Answer {
        let Some(object) = value.as_object() else {
            return Answer::text(&self.placeholder);
        };

        let text = self
            .answer_fields
            .iter()
            .find_map(|field| object.get(field).and_then(answer_text))
            .unwrap_or_else(|| self.placeholder.clone());

        let sources = object
            .get("sources")
            .cloned()
            .and_then(|raw| serde_json::from_value::<Vec<SourceDocument>>(raw).ok())
            .unwrap_or_default();

        Answer { text, sources }
    }
}

fn answer_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".into()),
        _ => None,
    }
}

impl Default for ResponseContract {
    fn default() -> Self {
        Self::new(
            ANSWER_FIELDS.iter().map(|f| (*f).to_string()).collect(),
            PLACEHOLDER_ANSWER,
        )
    }
}

/// A backend that can answer a question.
///
/// The HTTP endpoint client and the fallback chain both implement this, so
/// the orchestrator never knows how many endpoints stand behind it.
#[async_trait]
pub trait AnsweringService: Send + Sync {
    /// A human-readable name (e.g. "primary", "fallback").
    fn name(&self) -> &str;

    /// Send one question and wait for the answer.
    async fn query(&self, request: QueryRequest) -> std::result::Result<Answer, ServiceError>;

    /// Health check — can we reach the service?
    async fn health_check(&self) -> std::result::Result<bool, ServiceError> {
        Ok(true)
    }
}
