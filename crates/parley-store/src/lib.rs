//! # parley-store
//!
//! Local persistence for Parley conversations.
//!
//! Storage is modelled as a flat key-value space of JSON records, the
//! same shape a browser's local storage offers.  Two backends are
//! provided: a SQLite-backed [`Database`] for real use and an in-memory
//! [`MemoryStore`] for tests and ephemeral sessions.  [`ChatStore`] sits
//! on top of either and exposes typed load/save helpers for the
//! conversation list, the per-conversation message logs and a couple of
//! settings records.

pub mod chat_store;
pub mod conversations;
pub mod database;
pub mod kv;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod records;
pub mod settings;

mod error;

pub use chat_store::ChatStore;
pub use database::Database;
pub use error::{Result, StoreError};
pub use kv::{KeyValueStore, MemoryStore};
pub use models::*;
