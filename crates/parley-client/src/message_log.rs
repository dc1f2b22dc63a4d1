//! The message log of one conversation.
//!
//! The session keeps exactly one log "live" (the active conversation's);
//! the send path also builds short-lived detached logs to reconcile a
//! reply for a conversation that is no longer on screen.

use parley_shared::types::{ConversationId, MessageId, MessageStatus};
use parley_store::Message;

/// Ordered messages of a single conversation, in creation order.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    conversation_id: Option<ConversationId>,
    messages: Vec<Message>,
}

impl MessageLog {
    /// A log bound to no conversation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A log for `conversation_id`, replacing any previous content wholesale.
    pub fn loaded(conversation_id: ConversationId, messages: Vec<Message>) -> Self {
        Self {
            conversation_id: Some(conversation_id),
            messages,
        }
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Whether the log holds anything worth writing back.
    ///
    /// An empty log is never persisted: it would clobber a conversation
    /// whose history simply has not been loaded into this log.
    pub fn should_persist(&self) -> bool {
        self.conversation_id.is_some() && !self.messages.is_empty()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Advance the status of one local-user message.
    ///
    /// Unknown ids, contact messages and backwards moves are ignored.
    /// Returns `true` if the message changed.
    pub fn update_status(&mut self, id: &MessageId, status: MessageStatus) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| &m.id == id) else {
            return false;
        };
        advance(message, status)
    }

    /// Mark every local-user message as `read`.  Returns how many changed.
    pub fn mark_all_user_messages_read(&mut self) -> usize {
        let mut changed = 0;
        for message in &mut self.messages {
            if advance(message, MessageStatus::Read) {
                changed += 1;
            }
        }
        changed
    }
}

fn advance(message: &mut Message, next: MessageStatus) -> bool {
    if !message.is_from_user() {
        return false;
    }
    match message.status {
        Some(current) if !current.can_advance_to(next) => false,
        _ => {
            message.status = Some(next);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv() -> ConversationId {
        ConversationId::from("chat_log")
    }

    #[test]
    fn append_preserves_call_order() {
        let mut log = MessageLog::loaded(conv(), Vec::new());
        for i in 0..20 {
            log.append(Message::outgoing(&conv(), format!("m{i}")));
        }

        let contents: Vec<_> = log.messages().iter().map(|m| m.content.as_str()).collect();
        let expected: Vec<_> = (0..20).map(|i| format!("m{i}")).collect();
        assert_eq!(contents, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn status_never_regresses() {
        let mut log = MessageLog::loaded(conv(), Vec::new());
        let msg = Message::outgoing(&conv(), "hi");
        let id = msg.id.clone();
        log.append(msg);

        assert!(log.update_status(&id, MessageStatus::Delivered));
        assert!(log.update_status(&id, MessageStatus::Read));
        assert!(!log.update_status(&id, MessageStatus::Delivered));
        assert!(!log.update_status(&id, MessageStatus::Sent));
        assert_eq!(log.get(&id).unwrap().status, Some(MessageStatus::Read));
    }

    #[test]
    fn update_status_ignores_unknown_and_contact() {
        let mut log = MessageLog::loaded(conv(), Vec::new());
        let reply = Message::reply(&conv(), "hello");
        let reply_id = reply.id.clone();
        log.append(reply);

        assert!(!log.update_status(&MessageId::from("missing"), MessageStatus::Read));
        assert!(!log.update_status(&reply_id, MessageStatus::Read));
        assert_eq!(log.get(&reply_id).unwrap().status, None);
    }

    #[test]
    fn mark_all_read_touches_only_user_messages() {
        let mut log = MessageLog::loaded(conv(), Vec::new());
        log.append(Message::outgoing(&conv(), "one"));
        log.append(Message::reply(&conv(), "r"));
        log.append(Message::outgoing(&conv(), "two"));

        assert_eq!(log.mark_all_user_messages_read(), 2);
        assert_eq!(log.mark_all_user_messages_read(), 0);
        for m in log.messages() {
            if m.is_from_user() {
                assert_eq!(m.status, Some(MessageStatus::Read));
            } else {
                assert_eq!(m.status, None);
            }
        }
    }

    #[test]
    fn user_message_without_status_can_be_marked() {
        let mut msg = Message::outgoing(&conv(), "legacy");
        msg.status = None;
        let mut log = MessageLog::loaded(conv(), vec![msg]);

        assert_eq!(log.mark_all_user_messages_read(), 1);
    }

    #[test]
    fn persistence_guard() {
        assert!(!MessageLog::empty().should_persist());

        let mut log = MessageLog::loaded(conv(), Vec::new());
        assert!(!log.should_persist());
        log.append(Message::outgoing(&conv(), "x"));
        assert!(log.should_persist());
    }
}
