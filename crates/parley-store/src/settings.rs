//! Small settings records: the webhook URL and the stable session id.

use parley_shared::constants::{SESSION_ID_KEY, WEBHOOK_URL_KEY};

use crate::chat_store::ChatStore;
use crate::error::Result;
use crate::kv::KeyValueStore;

impl<B: KeyValueStore> ChatStore<B> {
    /// The stored webhook URL, if one was saved.
    pub fn webhook_url(&self) -> Option<String> {
        self.read_text(WEBHOOK_URL_KEY)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
    }

    /// Persist the webhook URL.  Validation is the caller's job.
    pub fn save_webhook_url(&self, url: &str) -> Result<()> {
        self.write_text(WEBHOOK_URL_KEY, url.trim())?;
        tracing::info!("webhook URL saved");
        Ok(())
    }

    /// The per-installation session id, created on first use.
    pub fn session_id(&self) -> Result<String> {
        if let Some(existing) = self.read_text(SESSION_ID_KEY).filter(|s| !s.is_empty()) {
            return Ok(existing);
        }

        let random = uuid::Uuid::new_v4().simple().to_string();
        let session_id = format!("session_{}", &random[..13]);
        self.write_text(SESSION_ID_KEY, &session_id)?;

        tracing::debug!(%session_id, "created session id");
        Ok(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[test]
    fn session_id_is_stable() {
        let store = ChatStore::new(MemoryStore::new());
        let first = store.session_id().unwrap();
        let second = store.session_id().unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("session_"));
        assert_eq!(first.len(), "session_".len() + 13);
    }

    #[test]
    fn webhook_url_round_trip() {
        let store = ChatStore::new(MemoryStore::new());
        assert_eq!(store.webhook_url(), None);

        store.save_webhook_url("  https://n8n.example/webhook/chat ").unwrap();
        assert_eq!(
            store.webhook_url().as_deref(),
            Some("https://n8n.example/webhook/chat")
        );

        store.save_webhook_url("").unwrap();
        assert_eq!(store.webhook_url(), None);
    }

    #[test]
    fn webhook_url_shares_the_browser_record() {
        let store = ChatStore::new(MemoryStore::new());
        store
            .backend()
            .set("n8n_webhook_url", "https://n8n.example/webhook/legacy")
            .unwrap();
        assert_eq!(
            store.webhook_url().as_deref(),
            Some("https://n8n.example/webhook/legacy")
        );

        store.save_webhook_url("https://n8n.example/webhook/new").unwrap();
        assert_eq!(
            store.backend().get("n8n_webhook_url").unwrap().as_deref(),
            Some("https://n8n.example/webhook/new")
        );
        assert_eq!(store.backend().get("webhook_url").unwrap(), None);
    }
}
