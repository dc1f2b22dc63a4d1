//! Typed access to the JSON records Parley keeps in a [`KeyValueStore`].
//!
//! Reads never fail the caller: a missing, unreadable or undecodable
//! record is reported as absent (and logged).  Writes return
//! [`Result`] so the caller can decide how loudly to complain.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::kv::KeyValueStore;

/// Persistent store adapter over any [`KeyValueStore`] backend.
pub struct ChatStore<B> {
    backend: B,
}

impl<B: KeyValueStore> ChatStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Access the raw backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read and decode a record, treating every failure as "absent".
    pub(crate) fn read_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read record, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt record, treating as absent");
                None
            }
        }
    }

    /// Serialize and overwrite a record.
    pub(crate) fn write_record<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw)
    }

    /// Read a plain-text record (no JSON decoding).
    pub(crate) fn read_text(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read record, treating as absent");
                None
            }
        }
    }

    pub(crate) fn write_text(&self, key: &str, value: &str) -> Result<()> {
        self.backend.set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[test]
    fn corrupt_record_reads_as_absent() {
        let store = ChatStore::new(MemoryStore::new());
        store.backend().set("k", "{not json").unwrap();

        let value: Option<Vec<String>> = store.read_record("k");
        assert!(value.is_none());
    }

    #[test]
    fn write_then_read_record() {
        let store = ChatStore::new(MemoryStore::new());
        store.write_record("k", &vec!["a".to_string()]).unwrap();

        let value: Option<Vec<String>> = store.read_record("k");
        assert_eq!(value, Some(vec!["a".to_string()]));
    }
}
