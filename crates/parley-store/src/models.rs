//! Domain model structs persisted as JSON records.
//!
//! Field names follow the stored record format (`lastMessage`, `unread`,
//! ...) and every non-identity field default-fills, so records written by
//! older versions that lack a field still load.

use chrono::{Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use parley_shared::constants::NEW_CONVERSATION_PREVIEW;
use parley_shared::types::{ConversationId, MessageId, MessageStatus, Sender};

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// A named thread of messages, tracked independently of its content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// Display name, `Chat N` by default.
    #[serde(default)]
    pub name: String,
    /// Optional avatar reference.  Never set by this crate, kept on round-trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Preview of the last message sent.
    #[serde(default)]
    pub last_message: String,
    /// Local wall-clock time of the last activity, `HH:MM`.
    #[serde(default)]
    pub time: String,
    /// Number of unread messages.
    #[serde(default)]
    pub unread: u32,
    /// Presence flag.  Cosmetic only.
    #[serde(default)]
    pub online: bool,
}

impl Conversation {
    /// Build a fresh, empty conversation named `name`.
    pub fn new(id: ConversationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: None,
            last_message: NEW_CONVERSATION_PREVIEW.to_string(),
            time: clock_time(),
            unread: 0,
            online: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier (`<conversation>-<millis>-<seq>`).
    pub id: MessageId,
    #[serde(default)]
    pub content: String,
    pub sender: Sender,
    /// Creation time, ISO-8601.
    #[serde(default)]
    pub timestamp: String,
    /// Delivery status.  Only local-user messages carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
}

impl Message {
    /// A message typed by the local user, starting life as `sent`.
    pub fn outgoing(conversation_id: &ConversationId, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::next_for(conversation_id),
            content: content.into(),
            sender: Sender::User,
            timestamp: iso_timestamp(),
            status: Some(MessageStatus::Sent),
        }
    }

    /// A message produced by the remote side.  Carries no status.
    pub fn reply(conversation_id: &ConversationId, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::next_for(conversation_id),
            content: content.into(),
            sender: Sender::Contact,
            timestamp: iso_timestamp(),
            status: None,
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Current local time formatted for the conversation list.
pub fn clock_time() -> String {
    Local::now().format("%H:%M").to_string()
}

fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
