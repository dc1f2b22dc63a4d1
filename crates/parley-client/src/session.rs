//! The chat session: composition root and the only mutation path into
//! conversation and message state.
//!
//! The presentation layer reads through the accessors (or a
//! [`SessionSnapshot`]), listens to [`SessionEvent`]s, and changes state
//! through four operations: [`select_conversation`], [`send`],
//! [`create_conversation`] and [`delete_conversation`].
//!
//! [`select_conversation`]: ChatSession::select_conversation
//! [`send`]: ChatSession::send
//! [`create_conversation`]: ChatSession::create_conversation
//! [`delete_conversation`]: ChatSession::delete_conversation

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use futures::FutureExt;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use parley_shared::constants::{EVENT_CHANNEL_CAPACITY, GENERIC_FAILURE_REASON};
use parley_shared::types::ConversationId;
use parley_store::{ChatStore, Conversation, KeyValueStore, Message};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::events::{EventBus, SessionEvent};
use crate::orchestrator::{self, SendOutcome};
use crate::responder::{validate_webhook_url, Responder, ResponderOutcome};
use crate::state::{SessionSnapshot, SessionState};

/// One user's chat session over a store backend `B`.
///
/// Cheap to share behind an [`Arc`]; every method takes `&self`.  State
/// sits behind one mutex that is never held across an `.await`, so a send
/// awaiting its reply does not block selecting, creating or deleting.
pub struct ChatSession<B: KeyValueStore> {
    state: Mutex<SessionState<B>>,
    responder: RwLock<Arc<dyn Responder>>,
    events: EventBus,
}

impl<B: KeyValueStore> ChatSession<B> {
    /// Load the conversation list from `store`.  Nothing is selected yet.
    pub fn open(store: ChatStore<B>, responder: Arc<dyn Responder>) -> Self {
        Self {
            state: Mutex::new(SessionState::load(store)),
            responder: RwLock::new(responder),
            events: EventBus::new(EVENT_CHANNEL_CAPACITY),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Swap the responder used by sends dispatched from now on.
    pub fn replace_responder(&self, responder: Arc<dyn Responder>) {
        *self
            .responder
            .write()
            .unwrap_or_else(PoisonError::into_inner) = responder;
        info!("responder replaced");
    }

    /// Switch sends to the webhook at `url` and remember it in the store.
    ///
    /// Only the webhook setting is written; conversation and message
    /// records are untouched.  An invalid URL changes nothing.
    pub fn use_webhook(&self, url: &str, config: &ClientConfig) -> Result<()> {
        validate_webhook_url(url)?;

        let responder = {
            let state = self.lock_state();
            let responder = config.webhook_responder(url, &state.store)?;
            state.store.save_webhook_url(url)?;
            responder
        };

        info!(url = %responder.url(), "webhook updated");
        self.replace_responder(Arc::new(responder));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_state().snapshot()
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.lock_state().registry.conversations().to_vec()
    }

    pub fn active_conversation_id(&self) -> Option<ConversationId> {
        self.lock_state().active.clone()
    }

    pub fn active_conversation(&self) -> Option<Conversation> {
        let state = self.lock_state();
        let id = state.active.as_ref()?;
        state.registry.get(id).cloned()
    }

    /// The active conversation's log, in creation order.
    pub fn messages(&self) -> Vec<Message> {
        self.lock_state().log.messages().to_vec()
    }

    /// `true` while any send is awaiting its response.
    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading()
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Make `id` active and load its history in place of the visible log.
    ///
    /// An empty id clears the selection.  An unknown id is ignored.
    pub fn select_conversation(&self, id: &ConversationId) {
        let selected = if id.is_empty() {
            None
        } else {
            Some(id.clone())
        };

        {
            let mut state = self.lock_state();
            if let Some(id) = &selected {
                if !state.registry.contains(id) {
                    warn!(conversation_id = %id, "ignoring selection of unknown conversation");
                    return;
                }
            }
            state.activate(selected.clone());
        }

        self.emit_selection(selected);
    }

    /// Create a conversation, put it first in the list and select it.
    pub fn create_conversation(&self) -> Conversation {
        let conversation = {
            let mut state = self.lock_state();
            let conversation = state.registry.create();
            state.persist_conversations();
            if let Err(e) = state.store.init_messages(&conversation.id) {
                error!(conversation_id = %conversation.id, error = %e, "failed to initialise message log");
            }
            state.activate(Some(conversation.id.clone()));
            conversation
        };

        info!(conversation_id = %conversation.id, name = %conversation.name, "conversation created");
        self.events.emit(SessionEvent::ConversationsChanged);
        self.emit_selection(Some(conversation.id.clone()));
        conversation
    }

    /// Delete a conversation and its stored history.
    ///
    /// Deleting the active conversation clears the selection and the
    /// visible log in the same step.  Returns `false` if `id` was unknown.
    pub fn delete_conversation(&self, id: &ConversationId) -> bool {
        let (removed, was_active) = {
            let mut state = self.lock_state();
            let removed = state.registry.remove(id);
            if removed.is_some() {
                state.persist_conversations();
            }
            if let Err(e) = state.store.delete_messages(id) {
                error!(conversation_id = %id, error = %e, "failed to delete message log");
            }

            let was_active = state.active.as_ref() == Some(id);
            if was_active {
                state.activate(None);
            }
            (removed, was_active)
        };

        let Some(removed) = removed else {
            debug!(conversation_id = %id, "delete of unknown conversation");
            return false;
        };

        info!(conversation_id = %id, "conversation deleted");
        self.events.emit(SessionEvent::ConversationsChanged);
        if was_active {
            self.emit_selection(None);
        }
        self.events.emit(SessionEvent::ConversationDeleted {
            conversation_id: removed.id,
            name: removed.name,
        });
        true
    }

    /// Send `content` to the active conversation and wait for the outcome.
    ///
    /// The message is appended (as `sent`) before the responder is called.
    /// On delivery it becomes `delivered`, the reply is appended and every
    /// user message is marked `read`; on failure it stays `sent` and a
    /// [`SessionEvent::DeliveryFailed`] is emitted.
    pub async fn send(&self, content: &str) -> SendOutcome {
        let (pending, became_busy) = {
            let mut state = self.lock_state();
            let was_loading = state.is_loading();
            match orchestrator::begin(&mut state, content) {
                Ok(pending) => (pending, !was_loading),
                Err(rejection) => {
                    debug!(?rejection, "send rejected");
                    return SendOutcome::Rejected(rejection);
                }
            }
        };

        let _in_flight = InFlightGuard {
            session: self,
            conversation_id: pending.conversation_id.clone(),
        };

        self.events.emit(SessionEvent::MessagesChanged {
            conversation_id: pending.conversation_id.clone(),
        });
        self.events.emit(SessionEvent::ConversationsChanged);
        if became_busy {
            self.events
                .emit(SessionEvent::LoadingChanged { is_loading: true });
        }

        let responder = self.responder();
        let outcome = match AssertUnwindSafe(responder.send(&pending.request))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(conversation_id = %pending.conversation_id, "responder panicked");
                ResponderOutcome::failed(GENERIC_FAILURE_REASON)
            }
        };

        let result = {
            let mut state = self.lock_state();
            orchestrator::settle(&mut state, &pending, outcome)
        };

        match &result {
            SendOutcome::Delivered { .. } => {
                self.events.emit(SessionEvent::MessagesChanged {
                    conversation_id: pending.conversation_id.clone(),
                });
            }
            SendOutcome::Failed { message_id, reason } => {
                self.events.emit(SessionEvent::DeliveryFailed {
                    conversation_id: pending.conversation_id.clone(),
                    message_id: message_id.clone(),
                    reason: reason.clone(),
                });
            }
            SendOutcome::Discarded { .. } | SendOutcome::Rejected(_) => {}
        }

        result
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    // No panics happen while the lock is held, so a poisoned lock still
    // guards consistent state.
    fn lock_state(&self) -> MutexGuard<'_, SessionState<B>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn responder(&self) -> Arc<dyn Responder> {
        Arc::clone(&self.responder.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn emit_selection(&self, conversation_id: Option<ConversationId>) {
        self.events.emit(SessionEvent::ActiveConversationChanged {
            conversation_id: conversation_id.clone(),
        });
        if let Some(conversation_id) = conversation_id {
            self.events
                .emit(SessionEvent::MessagesChanged { conversation_id });
        }
    }
}

/// Clears a conversation's in-flight mark when the send finishes, panics
/// or is dropped.
struct InFlightGuard<'a, B: KeyValueStore> {
    session: &'a ChatSession<B>,
    conversation_id: ConversationId,
}

impl<B: KeyValueStore> Drop for InFlightGuard<'_, B> {
    fn drop(&mut self) {
        let now_idle = {
            let mut state = self.session.lock_state();
            state.in_flight.remove(&self.conversation_id);
            !state.is_loading()
        };
        if now_idle {
            self.session
                .events
                .emit(SessionEvent::LoadingChanged { is_loading: false });
        }
    }
}
