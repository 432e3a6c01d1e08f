//! Conversation identity — one correlation token per widget lifetime.
//!
//! The id is derived from the creation time plus a short random suffix, so
//! two widgets opened in the same millisecond still get different ids. It is
//! never persisted: a fresh widget means a fresh id.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "user";

/// Opaque identifier sent with every query of one widget session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Allocate a new id of the form `<prefix>-<unix millis>-<8 hex chars>`.
    pub fn generate(prefix: &str) -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{prefix}-{millis}-{}", &suffix[..8]))
    }

    /// Wrap an externally supplied id (e.g. one handed over by a host page).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_id_has_prefix_and_timestamp() {
        let id = ConversationId::generate(DEFAULT_PREFIX);
        let parts: Vec<&str> = id.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "user");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn ids_do_not_collide_within_a_burst() {
        let ids: HashSet<ConversationId> = (0..1_000)
            .map(|_| ConversationId::generate("burst"))
            .collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ConversationId::from_string("user-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"user-123\"");
    }
}
