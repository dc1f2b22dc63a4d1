//! Responder doubles for session tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use parley_store::{ChatStore, MemoryStore};

use crate::responder::{Responder, ResponderOutcome, ResponderRequest};
use crate::session::ChatSession;

/// Replays a fixed list of outcomes, then delivers "ok".
#[derive(Default)]
pub(crate) struct ScriptedResponder {
    outcomes: Mutex<VecDeque<ResponderOutcome>>,
    requests: Mutex<Vec<ResponderRequest>>,
}

impl ScriptedResponder {
    pub fn new(outcomes: impl IntoIterator<Item = ResponderOutcome>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::default(),
        })
    }

    pub fn requests(&self) -> Vec<ResponderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    async fn send(&self, request: &ResponderRequest) -> ResponderOutcome {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ResponderOutcome::delivered("ok"))
    }
}

/// Holds each request until the test releases it, keyed by message text.
#[derive(Default)]
pub(crate) struct GatedResponder {
    gates: Mutex<HashMap<String, oneshot::Receiver<ResponderOutcome>>>,
}

impl GatedResponder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a gate for `text`; send the outcome through the returned
    /// sender to let that request complete.
    pub fn gate(&self, text: &str) -> oneshot::Sender<ResponderOutcome> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(text.to_string(), rx);
        tx
    }
}

#[async_trait]
impl Responder for GatedResponder {
    async fn send(&self, request: &ResponderRequest) -> ResponderOutcome {
        let gate = self.gates.lock().unwrap().remove(&request.text);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| ResponderOutcome::failed("gate dropped")),
            None => ResponderOutcome::failed("no gate registered"),
        }
    }
}

/// Blows up instead of answering.
pub(crate) struct PanickingResponder;

#[async_trait]
impl Responder for PanickingResponder {
    async fn send(&self, _request: &ResponderRequest) -> ResponderOutcome {
        panic!("responder exploded");
    }
}

/// A session over a shared in-memory store, so tests can inspect storage.
pub(crate) fn memory_session(
    responder: Arc<dyn Responder>,
) -> (Arc<ChatSession<Arc<MemoryStore>>>, ChatStore<Arc<MemoryStore>>) {
    let backend = Arc::new(MemoryStore::new());
    let session = ChatSession::open(ChatStore::new(Arc::clone(&backend)), responder);
    (Arc::new(session), ChatStore::new(backend))
}
