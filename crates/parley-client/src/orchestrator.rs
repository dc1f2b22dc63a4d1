//! The send state machine.
//!
//! A send moves through: validate -> optimistic append -> dispatch ->
//! settle (delivered or failed) -> release.  [`begin`] and [`settle`] are
//! the two synchronous halves around the single suspension point (the
//! responder call), which [`ChatSession::send`](crate::ChatSession::send)
//! drives.  Releasing the awaiting-response flag is done by a drop guard
//! in the session so it happens whatever the responder does.

use tracing::{debug, info, warn};

use parley_shared::constants::FALLBACK_REPLY;
use parley_shared::types::{ConversationId, MessageId, MessageStatus};
use parley_store::{KeyValueStore, Message};

use crate::message_log::MessageLog;
use crate::responder::{ResponderOutcome, ResponderRequest};
use crate::state::SessionState;

/// Why a send was refused before anything changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejection {
    /// Content was empty or whitespace only.
    EmptyContent,
    /// Nothing is selected to send to.
    NoActiveConversation,
    /// The active conversation already has a send awaiting its response.
    AwaitingResponse,
}

/// How a send ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Refused up front; no state changed.
    Rejected(SendRejection),
    /// Delivered; the reply was appended and the user's messages marked read.
    Delivered {
        message_id: MessageId,
        reply_id: MessageId,
    },
    /// Not delivered; the message stays at `sent`.
    Failed { message_id: MessageId, reason: String },
    /// The conversation was deleted before the responder answered.
    Discarded { message_id: MessageId },
}

impl SendOutcome {
    pub fn message_id(&self) -> Option<&MessageId> {
        match self {
            Self::Rejected(_) => None,
            Self::Delivered { message_id, .. }
            | Self::Failed { message_id, .. }
            | Self::Discarded { message_id } => Some(message_id),
        }
    }
}

/// A send that passed validation and is waiting on the responder.
#[derive(Debug, Clone)]
pub(crate) struct PendingSend {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    pub request: ResponderRequest,
}

/// Validate, then optimistically append the outgoing message.
///
/// On success the message is in the active log with status `sent`, the
/// conversation entry shows it as preview, both are persisted, and the
/// conversation is marked in flight.
pub(crate) fn begin<B: KeyValueStore>(
    state: &mut SessionState<B>,
    content: &str,
) -> Result<PendingSend, SendRejection> {
    if content.trim().is_empty() {
        return Err(SendRejection::EmptyContent);
    }
    let Some(conversation_id) = state.active.clone() else {
        return Err(SendRejection::NoActiveConversation);
    };
    if state.in_flight.contains(&conversation_id) {
        return Err(SendRejection::AwaitingResponse);
    }

    let message = Message::outgoing(&conversation_id, content);
    let message_id = message.id.clone();

    state.log.append(message);
    state.persist_active_log();

    if state.registry.touch_on_send(&conversation_id, content) {
        state.persist_conversations();
    }

    state.in_flight.insert(conversation_id.clone());

    debug!(conversation_id = %conversation_id, message_id = %message_id, "message queued for dispatch");

    Ok(PendingSend {
        request: ResponderRequest {
            conversation_id: conversation_id.clone(),
            text: content.to_string(),
        },
        conversation_id,
        message_id,
    })
}

/// Apply the responder's outcome to the conversation the send came from.
///
/// That conversation may no longer be on screen: its stored log is then
/// updated instead of the visible one.  If it was deleted meanwhile the
/// outcome is dropped.
pub(crate) fn settle<B: KeyValueStore>(
    state: &mut SessionState<B>,
    pending: &PendingSend,
    outcome: ResponderOutcome,
) -> SendOutcome {
    let conversation_id = &pending.conversation_id;
    let message_id = pending.message_id.clone();

    if !state.registry.contains(conversation_id) {
        info!(conversation_id = %conversation_id, "conversation deleted while awaiting response, dropping outcome");
        return SendOutcome::Discarded { message_id };
    }

    match outcome {
        ResponderOutcome::Delivered { reply } => {
            let text = reply
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_REPLY.to_string());
            let reply = Message::reply(conversation_id, text);
            let reply_id = reply.id.clone();

            if state.active.as_ref() == Some(conversation_id) {
                reconcile_delivery(&mut state.log, &message_id, reply);
                state.persist_active_log();
            } else {
                let mut log = MessageLog::loaded(
                    conversation_id.clone(),
                    state.store.load_messages(conversation_id),
                );
                reconcile_delivery(&mut log, &message_id, reply);
                state.persist_log(&log);
            }

            info!(conversation_id = %conversation_id, message_id = %message_id, "message delivered");
            SendOutcome::Delivered {
                message_id,
                reply_id,
            }
        }
        ResponderOutcome::Failed { reason } => {
            warn!(
                conversation_id = %conversation_id,
                message_id = %message_id,
                reason = %reason,
                "message delivery failed"
            );
            SendOutcome::Failed { message_id, reason }
        }
    }
}

/// Delivered, then the reply, then "the other side has seen everything".
fn reconcile_delivery(log: &mut MessageLog, message_id: &MessageId, reply: Message) {
    log.update_status(message_id, MessageStatus::Delivered);
    log.append(reply);
    log.mark_all_user_messages_read();
}
