//! Session state owned by [`ChatSession`](crate::ChatSession).
//!
//! [`SessionState`] lives behind a single mutex inside the session.  Every
//! method here runs with that lock held and never awaits, so each one is
//! atomic from the caller's point of view.

use std::collections::HashSet;

use serde::Serialize;
use tracing::error;

use parley_shared::types::ConversationId;
use parley_store::{ChatStore, Conversation, KeyValueStore, Message};

use crate::message_log::MessageLog;
use crate::registry::ConversationRegistry;

/// Central mutable state of one chat session.
pub(crate) struct SessionState<B> {
    /// Durable mirror of everything below.
    pub store: ChatStore<B>,

    /// Conversation list, most recent first.
    pub registry: ConversationRegistry,

    /// Currently selected conversation.  `None` until something is
    /// selected or created, and again after the active one is deleted.
    pub active: Option<ConversationId>,

    /// Log of the active conversation.  Empty and unbound when `active`
    /// is `None`.
    pub log: MessageLog,

    /// Conversations with a send awaiting its response.
    pub in_flight: HashSet<ConversationId>,
}

impl<B: KeyValueStore> SessionState<B> {
    /// Rebuild state from whatever the store holds.  Nothing is selected.
    pub fn load(store: ChatStore<B>) -> Self {
        let registry = ConversationRegistry::from_stored(store.load_conversations());
        tracing::info!(conversations = registry.len(), "session state loaded");

        Self {
            store,
            registry,
            active: None,
            log: MessageLog::empty(),
            in_flight: HashSet::new(),
        }
    }

    /// Make `id` the active conversation and replace the visible log
    /// wholesale with its stored history.  `None` clears both.
    pub fn activate(&mut self, id: Option<ConversationId>) {
        self.log = match &id {
            Some(id) => MessageLog::loaded(id.clone(), self.store.load_messages(id)),
            None => MessageLog::empty(),
        };
        self.active = id;

        tracing::debug!(
            conversation_id = ?self.active,
            messages = self.log.len(),
            "active conversation changed"
        );
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn persist_conversations(&self) {
        if let Err(e) = self.store.save_conversations(self.registry.conversations()) {
            error!(error = %e, "failed to persist conversation list");
        }
    }

    /// Write the active log back, unless the persistence guard says no.
    pub fn persist_active_log(&self) {
        self.persist_log(&self.log);
    }

    /// Write any log back, unless the persistence guard says no.
    pub fn persist_log(&self, log: &MessageLog) {
        let Some(conversation_id) = log.conversation_id() else {
            return;
        };
        if !log.should_persist() {
            return;
        }
        if let Err(e) = self.store.save_messages(conversation_id, log.messages()) {
            error!(conversation_id = %conversation_id, error = %e, "failed to persist message log");
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            conversations: self.registry.conversations().to_vec(),
            active_conversation_id: self.active.clone(),
            messages: self.log.messages().to_vec(),
            is_loading: self.is_loading(),
        }
    }
}

/// Point-in-time copy of everything the presentation layer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub conversations: Vec<Conversation>,
    pub active_conversation_id: Option<ConversationId>,
    pub messages: Vec<Message>,
    pub is_loading: bool,
}

impl SessionSnapshot {
    pub fn active_conversation(&self) -> Option<&Conversation> {
        let id = self.active_conversation_id.as_ref()?;
        self.conversations.iter().find(|c| &c.id == id)
    }
}
