//! # parley-shared
//!
//! Types shared by every Parley crate: identifiers, sender/status enums,
//! storage record names and the webhook wire protocol.  Nothing here does
//! I/O.

pub mod constants;
pub mod protocol;
pub mod types;
