//! [`KeyValueStore`] implementation for the SQLite [`Database`].

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::kv::KeyValueStore;

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM kv_records WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO kv_records (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM kv_records WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_records_crud() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get("missing").unwrap(), None);

        db.set("conversations", "[]").unwrap();
        db.set("conversations", r#"[{"id":"x"}]"#).unwrap();
        assert_eq!(db.get("conversations").unwrap().as_deref(), Some(r#"[{"id":"x"}]"#));

        db.remove("conversations").unwrap();
        db.remove("conversations").unwrap();
        assert_eq!(db.get("conversations").unwrap(), None);
    }

    #[test]
    fn sqlite_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");

        {
            let db = Database::open_at(&path).unwrap();
            db.set("webhook_url", "https://example.test/hook").unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        assert_eq!(
            db.get("webhook_url").unwrap().as_deref(),
            Some("https://example.test/hook")
        );
    }
}
