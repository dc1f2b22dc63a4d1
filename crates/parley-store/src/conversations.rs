//! The `conversations` record: the full, ordered conversation list.

use parley_shared::constants::CONVERSATIONS_KEY;

use crate::chat_store::ChatStore;
use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::models::Conversation;

impl<B: KeyValueStore> ChatStore<B> {
    /// Load the conversation list.  Missing or corrupt record => empty list.
    pub fn load_conversations(&self) -> Vec<Conversation> {
        self.read_record(CONVERSATIONS_KEY).unwrap_or_default()
    }

    /// Overwrite the conversation list with `conversations`.
    pub fn save_conversations(&self, conversations: &[Conversation]) -> Result<()> {
        self.write_record(CONVERSATIONS_KEY, conversations)?;
        tracing::debug!(count = conversations.len(), "saved conversation list");
        Ok(())
    }
}
