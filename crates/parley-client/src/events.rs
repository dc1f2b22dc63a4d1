//! Session events pushed to whoever renders the session.

use serde::Serialize;
use tokio::sync::broadcast;

use parley_shared::types::{ConversationId, MessageId};

pub const EVENT_CONVERSATIONS_CHANGED: &str = "conversations-changed";
pub const EVENT_ACTIVE_CONVERSATION_CHANGED: &str = "active-conversation-changed";
pub const EVENT_MESSAGES_CHANGED: &str = "messages-changed";
pub const EVENT_LOADING_CHANGED: &str = "loading-changed";
pub const EVENT_DELIVERY_FAILED: &str = "delivery-failed";
pub const EVENT_CONVERSATION_DELETED: &str = "conversation-deleted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    /// The conversation list changed (created, touched or deleted entry).
    ConversationsChanged,
    /// The active selection changed.  `None` means nothing is selected.
    ActiveConversationChanged {
        conversation_id: Option<ConversationId>,
    },
    /// The stored log of `conversation_id` changed.
    MessagesChanged { conversation_id: ConversationId },
    /// The awaiting-response flag flipped.
    LoadingChanged { is_loading: bool },
    /// A send did not go through.  Meant to be shown to the user.
    DeliveryFailed {
        conversation_id: ConversationId,
        message_id: MessageId,
        reason: String,
    },
    /// A conversation and its history were removed.
    ConversationDeleted {
        conversation_id: ConversationId,
        name: String,
    },
}

impl SessionEvent {
    /// Stable name of the event, for logging and IPC bridges.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConversationsChanged => EVENT_CONVERSATIONS_CHANGED,
            Self::ActiveConversationChanged { .. } => EVENT_ACTIVE_CONVERSATION_CHANGED,
            Self::MessagesChanged { .. } => EVENT_MESSAGES_CHANGED,
            Self::LoadingChanged { .. } => EVENT_LOADING_CHANGED,
            Self::DeliveryFailed { .. } => EVENT_DELIVERY_FAILED,
            Self::ConversationDeleted { .. } => EVENT_CONVERSATION_DELETED,
        }
    }
}

/// Fan-out of session events.  Emitting with no subscriber is fine.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: SessionEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            tracing::trace!(event = name, "no event subscribers");
        }
    }
}
