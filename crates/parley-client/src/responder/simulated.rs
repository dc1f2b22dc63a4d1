use async_trait::async_trait;

use super::{Responder, ResponderOutcome, ResponderRequest};

/// Offline responder with a handful of canned answers.
///
/// Used when no webhook is configured so the rest of the client can be
/// driven without a network.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedResponder;

impl SimulatedResponder {
    pub fn new() -> Self {
        Self
    }

    /// The canned reply for `text`.
    pub fn reply_for(text: &str) -> String {
        let lower = text.to_lowercase();
        if lower.contains("hello") || lower.contains("hi") {
            "Hello there! How can I help you today?".to_string()
        } else if lower.contains("help") {
            "I'm here to help! What do you need assistance with?".to_string()
        } else if lower.contains("thank") {
            "You're welcome! Let me know if there's anything else you need.".to_string()
        } else {
            format!("I received your message: \"{text}\"")
        }
    }
}

#[async_trait]
impl Responder for SimulatedResponder {
    async fn send(&self, request: &ResponderRequest) -> ResponderOutcome {
        tracing::debug!(conversation_id = %request.conversation_id, "simulated reply");
        ResponderOutcome::delivered(Self::reply_for(&request.text))
    }
}
