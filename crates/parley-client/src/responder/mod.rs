//! The responder boundary: whatever answers an outgoing message.
//!
//! The session only ever sees the two-shape [`ResponderOutcome`]; transport
//! details (status codes, timeouts, connection errors) are folded into a
//! failure reason by the implementation.

mod simulated;
mod webhook;

use async_trait::async_trait;

use parley_shared::types::ConversationId;

pub use simulated::SimulatedResponder;
pub use webhook::{validate_webhook_url, WebhookConfig, WebhookResponder};

/// One outgoing message handed to a [`Responder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderRequest {
    pub conversation_id: ConversationId,
    /// Raw text exactly as submitted.
    pub text: String,
}

/// What came back from the responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderOutcome {
    /// The message reached the other side.  `reply` is `None` when the
    /// other side answered without any text.
    Delivered { reply: Option<String> },
    /// The message did not make it, with a human-readable reason.
    Failed { reason: String },
}

impl ResponderOutcome {
    pub fn delivered(reply: impl Into<String>) -> Self {
        Self::Delivered {
            reply: Some(reply.into()),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Something that answers outgoing messages.
///
/// Implementations must not panic on transport problems; they report them
/// as [`ResponderOutcome::Failed`].  Any timeout is enforced here, the
/// session never cancels a dispatched send.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn send(&self, request: &ResponderRequest) -> ResponderOutcome;
}
