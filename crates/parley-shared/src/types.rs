use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Process-wide sequence appended to message ids so that two messages
/// created in the same millisecond never collide.
static MESSAGE_SEQ: AtomicU64 = AtomicU64::new(0);

// Conversation id = `chat_<epoch millis>_<7 random chars>`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn generate() -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("chat_{}_{}", Utc::now().timestamp_millis(), &suffix[..7]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id means "no conversation".
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// Message id = `<conversation id>-<epoch millis>-<sequence>`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn next_for(conversation_id: &ConversationId) -> Self {
        let seq = MESSAGE_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!(
            "{}-{}-{}",
            conversation_id,
            Utc::now().timestamp_millis(),
            seq
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The local user of this session.
    User,
    /// The remote side (the automation workflow).
    Contact,
}

/// Delivery status of a local-user message.
///
/// Variants are declared in lifecycle order so the derived `Ord` matches
/// the only legal direction of travel: `Sent < Delivered < Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

impl MessageStatus {
    /// Returns `true` when moving from `self` to `next` goes forward.
    pub fn can_advance_to(self, next: MessageStatus) -> bool {
        next > self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id_shape() {
        let id = ConversationId::generate();
        assert!(id.as_str().starts_with("chat_"));
        assert_eq!(id.as_str().rsplit('_').next().unwrap().len(), 7);
        assert!(!id.is_empty());
        assert!(ConversationId::from("  ").is_empty());
    }

    #[test]
    fn test_message_ids_unique_within_same_millisecond() {
        let conv = ConversationId::from("chat_1");
        let ids: std::collections::HashSet<_> =
            (0..500).map(|_| MessageId::next_for(&conv)).collect();
        assert_eq!(ids.len(), 500);
        assert!(ids.iter().all(|id| id.as_str().starts_with("chat_1-")));
    }

    #[test]
    fn test_status_only_moves_forward() {
        assert!(MessageStatus::Sent.can_advance_to(MessageStatus::Delivered));
        assert!(MessageStatus::Sent.can_advance_to(MessageStatus::Read));
        assert!(MessageStatus::Delivered.can_advance_to(MessageStatus::Read));
        assert!(!MessageStatus::Read.can_advance_to(MessageStatus::Delivered));
        assert!(!MessageStatus::Delivered.can_advance_to(MessageStatus::Sent));
        assert!(!MessageStatus::Read.can_advance_to(MessageStatus::Read));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Sender::Contact).unwrap(), "\"contact\"");
        assert_eq!(
            serde_json::from_str::<MessageStatus>("\"delivered\"").unwrap(),
            MessageStatus::Delivered
        );
    }
}
