//! # parley-client
//!
//! The chat session engine behind every Parley front-end.
//!
//! A [`ChatSession`] owns the conversation list, the visible message log
//! of the active conversation and the "awaiting response" flag.  It
//! mirrors every change to a [`parley_store::ChatStore`] and hands
//! outgoing messages to a [`Responder`] (a real webhook or the offline
//! simulator).  Front-ends read snapshots and subscribe to
//! [`SessionEvent`]s.

pub mod config;
pub mod events;
pub mod message_log;
pub mod registry;
pub mod responder;
pub mod session;

mod error;
mod orchestrator;
mod state;

#[cfg(test)]
mod test_support;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use events::{EventBus, SessionEvent};
pub use orchestrator::{SendOutcome, SendRejection};
pub use responder::{Responder, ResponderOutcome, ResponderRequest};
pub use session::ChatSession;
pub use state::SessionSnapshot;
