//! In-memory conversation list.
//!
//! The registry only manipulates the list; persisting it and moving the
//! active selection is the session's job.

use parley_shared::types::ConversationId;
use parley_store::{clock_time, Conversation};

/// Ordered list of conversations, most recently created first.
#[derive(Debug, Clone, Default)]
pub struct ConversationRegistry {
    conversations: Vec<Conversation>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from a stored list.
    ///
    /// Entries with an empty id or a duplicate id are dropped (first one
    /// wins) so ids stay unique.
    pub fn from_stored(stored: Vec<Conversation>) -> Self {
        let mut conversations: Vec<Conversation> = Vec::with_capacity(stored.len());
        for conversation in stored {
            if conversation.id.is_empty() {
                tracing::warn!("dropping stored conversation with empty id");
                continue;
            }
            if conversations.iter().any(|c| c.id == conversation.id) {
                tracing::warn!(conversation_id = %conversation.id, "dropping duplicate conversation");
                continue;
            }
            conversations.push(conversation);
        }
        Self { conversations }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &ConversationId) -> bool {
        self.get(id).is_some()
    }

    /// Create a conversation named `Chat {count + 1}` and put it first.
    pub fn create(&mut self) -> Conversation {
        let mut id = ConversationId::generate();
        while self.contains(&id) {
            id = ConversationId::generate();
        }

        let conversation = Conversation::new(id, format!("Chat {}", self.len() + 1));
        self.conversations.insert(0, conversation.clone());

        tracing::debug!(conversation_id = %conversation.id, name = %conversation.name, "conversation created");
        conversation
    }

    /// Record an outgoing message on the conversation's list entry.
    ///
    /// Returns `false` (and changes nothing) if `id` is unknown.
    pub fn touch_on_send(&mut self, id: &ConversationId, preview: &str) -> bool {
        let Some(conversation) = self.conversations.iter_mut().find(|c| &c.id == id) else {
            return false;
        };

        conversation.last_message = preview.to_string();
        conversation.time = clock_time();
        conversation.unread = 0;
        true
    }

    /// Remove a conversation, returning it if it existed.
    pub fn remove(&mut self, id: &ConversationId) -> Option<Conversation> {
        let index = self.conversations.iter().position(|c| &c.id == id)?;
        Some(self.conversations.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_names_and_prepends() {
        let mut registry = ConversationRegistry::new();
        let first = registry.create();
        let second = registry.create();

        assert_eq!(first.name, "Chat 1");
        assert_eq!(second.name, "Chat 2");
        assert_eq!(registry.conversations()[0].id, second.id);
        assert_eq!(registry.conversations()[1].id, first.id);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn name_uses_current_count() {
        let mut registry = ConversationRegistry::new();
        let a = registry.create();
        registry.create();
        registry.remove(&a.id);

        // One left, so the next one is "Chat 2" again.
        assert_eq!(registry.create().name, "Chat 2");
    }

    #[test]
    fn touch_updates_preview_and_clears_unread() {
        let mut stored = Conversation::new(ConversationId::from("chat_1"), "Chat 1");
        stored.unread = 4;
        let mut registry = ConversationRegistry::from_stored(vec![stored]);

        assert!(registry.touch_on_send(&ConversationId::from("chat_1"), "hello"));
        let conv = registry.get(&ConversationId::from("chat_1")).unwrap();
        assert_eq!(conv.last_message, "hello");
        assert_eq!(conv.unread, 0);
    }

    #[test]
    fn touch_unknown_is_noop() {
        let mut registry = ConversationRegistry::new();
        registry.create();
        let before = registry.conversations().to_vec();

        assert!(!registry.touch_on_send(&ConversationId::from("nope"), "x"));
        assert_eq!(registry.conversations(), before.as_slice());
    }

    #[test]
    fn from_stored_drops_duplicates_and_blank_ids() {
        let a = Conversation::new(ConversationId::from("a"), "first");
        let dup = Conversation::new(ConversationId::from("a"), "second");
        let blank = Conversation::new(ConversationId::from(""), "blank");

        let registry = ConversationRegistry::from_stored(vec![a, blank, dup]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.conversations()[0].name, "first");
    }

    #[test]
    fn remove_returns_entry() {
        let mut registry = ConversationRegistry::new();
        let conv = registry.create();

        assert_eq!(registry.remove(&conv.id).map(|c| c.id), Some(conv.id.clone()));
        assert!(registry.remove(&conv.id).is_none());
        assert!(registry.is_empty());
    }
}
