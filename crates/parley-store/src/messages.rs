//! The `messageHistory` record: conversation id -> ordered message log.
//!
//! Every write is a read-modify-write of the whole record.  Entries for
//! other conversations are carried over as raw JSON, so one malformed log
//! never takes its neighbours down with it.

use serde_json::{Map, Value};

use parley_shared::constants::MESSAGE_HISTORY_KEY;
use parley_shared::types::ConversationId;

use crate::chat_store::ChatStore;
use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::models::Message;

type History = Map<String, Value>;

impl<B: KeyValueStore> ChatStore<B> {
    /// Load the message log of one conversation.  Missing entry => empty.
    pub fn load_messages(&self, conversation_id: &ConversationId) -> Vec<Message> {
        let history = self.read_history();
        let Some(entry) = history.get(conversation_id.as_str()) else {
            return Vec::new();
        };

        match serde_json::from_value::<Vec<Message>>(entry.clone()) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "corrupt message log, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Set (or overwrite) the message log of one conversation.
    pub fn save_messages(&self, conversation_id: &ConversationId, messages: &[Message]) -> Result<()> {
        let mut history = self.read_history();
        history.insert(conversation_id.to_string(), serde_json::to_value(messages)?);
        self.write_record(MESSAGE_HISTORY_KEY, &history)?;

        tracing::debug!(
            conversation_id = %conversation_id,
            count = messages.len(),
            "saved message log"
        );
        Ok(())
    }

    /// Write an empty log for a freshly created conversation.
    pub fn init_messages(&self, conversation_id: &ConversationId) -> Result<()> {
        self.save_messages(conversation_id, &[])
    }

    /// Remove the message log of one conversation.
    pub fn delete_messages(&self, conversation_id: &ConversationId) -> Result<()> {
        let mut history = self.read_history();
        if history.remove(conversation_id.as_str()).is_none() {
            return Ok(());
        }
        self.write_record(MESSAGE_HISTORY_KEY, &history)?;

        tracing::debug!(conversation_id = %conversation_id, "deleted message log");
        Ok(())
    }

    fn read_history(&self) -> History {
        self.read_record(MESSAGE_HISTORY_KEY).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use parley_shared::types::MessageStatus;

    use crate::kv::MemoryStore;

    use super::*;

    fn conv(id: &str) -> ConversationId {
        ConversationId::from(id)
    }

    #[test]
    fn save_and_load_preserves_order() {
        let store = ChatStore::new(MemoryStore::new());
        let id = conv("chat_a");
        let messages: Vec<Message> = (0..5)
            .map(|i| Message::outgoing(&id, format!("m{i}")))
            .collect();

        store.save_messages(&id, &messages).unwrap();
        let loaded = store.load_messages(&id);
        assert_eq!(loaded, messages);
    }

    #[test]
    fn logs_are_independent_per_conversation() {
        let store = ChatStore::new(MemoryStore::new());
        let a = conv("chat_a");
        let b = conv("chat_b");

        store.save_messages(&a, &[Message::outgoing(&a, "for a")]).unwrap();
        store.save_messages(&b, &[Message::reply(&b, "for b")]).unwrap();

        assert_eq!(store.load_messages(&a)[0].content, "for a");
        assert_eq!(store.load_messages(&b)[0].content, "for b");
        assert!(store.load_messages(&conv("chat_c")).is_empty());
    }

    #[test]
    fn delete_removes_only_that_log() {
        let store = ChatStore::new(MemoryStore::new());
        let a = conv("chat_a");
        let b = conv("chat_b");
        store.save_messages(&a, &[Message::outgoing(&a, "x")]).unwrap();
        store.save_messages(&b, &[Message::outgoing(&b, "y")]).unwrap();

        store.delete_messages(&a).unwrap();
        store.delete_messages(&a).unwrap();

        assert!(store.load_messages(&a).is_empty());
        assert_eq!(store.load_messages(&b).len(), 1);
    }

    #[test]
    fn malformed_neighbour_survives_rewrite() {
        let store = ChatStore::new(MemoryStore::new());
        store
            .backend()
            .set(MESSAGE_HISTORY_KEY, r#"{"broken":[{"nope":1}]}"#)
            .unwrap();

        let a = conv("chat_a");
        assert!(store.load_messages(&conv("broken")).is_empty());
        store.save_messages(&a, &[Message::outgoing(&a, "x")]).unwrap();

        let raw = store.backend().get(MESSAGE_HISTORY_KEY).unwrap().unwrap();
        let history: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(history["broken"][0]["nope"], 1);
        assert_eq!(store.load_messages(&a).len(), 1);
    }

    #[test]
    fn corrupt_history_is_replaced_on_write() {
        let store = ChatStore::new(MemoryStore::new());
        store.backend().set(MESSAGE_HISTORY_KEY, "garbage").unwrap();

        let a = conv("chat_a");
        assert!(store.load_messages(&a).is_empty());
        store.init_messages(&a).unwrap();
        store.save_messages(&a, &[Message::outgoing(&a, "x")]).unwrap();

        let loaded = store.load_messages(&a);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].status, Some(MessageStatus::Sent));
    }

    #[test]
    fn reads_browser_record_format() {
        let store = ChatStore::new(MemoryStore::new());
        store
            .backend()
            .set(
                MESSAGE_HISTORY_KEY,
                r#"{"1":[
                    {"id":"1-1","content":"Hey","sender":"contact","timestamp":"2023-06-10T10:30:00"},
                    {"id":"1-2","content":"Hi!","sender":"user","timestamp":"2023-06-10T10:32:00","status":"read"}
                ]}"#,
            )
            .unwrap();

        let loaded = store.load_messages(&conv("1"));
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].status, Some(MessageStatus::Read));
        assert_eq!(loaded[0].timestamp, "2023-06-10T10:30:00");
    }
}
