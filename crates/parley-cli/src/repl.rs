//! The line REPL driving a [`ChatSession`].

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use parley_client::{ChatSession, ClientConfig, SendOutcome, SendRejection, SessionEvent};
use parley_shared::types::ConversationId;
use parley_store::{Conversation, KeyValueStore, Message};

use crate::commands::{self, Command, Target, HELP};

pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl<B: KeyValueStore + 'static> {
    session: Arc<ChatSession<B>>,
    config: ClientConfig,
}

impl<B: KeyValueStore + 'static> Repl<B> {
    pub fn new(session: Arc<ChatSession<B>>, config: ClientConfig) -> Self {
        Self { session, config }
    }

    /// Read stdin until EOF or `/quit`.
    pub async fn run(&self) -> anyhow::Result<()> {
        println!("{}", self.render_list());
        println!("type /help for commands");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let command = match commands::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            };
            if let Flow::Quit = self.handle(command) {
                break;
            }
        }
        Ok(())
    }

    pub fn handle(&self, command: Command) -> Flow {
        match command {
            Command::Empty => {}
            Command::New => {
                let conversation = self.session.create_conversation();
                println!("opened {}", conversation.name);
            }
            Command::List => println!("{}", self.render_list()),
            Command::Select(target) => match self.resolve(&target) {
                Some(id) => {
                    self.session.select_conversation(&id);
                    println!("{}", self.render_history());
                }
                None => println!("no such conversation"),
            },
            Command::Delete(target) => match self.resolve(&target) {
                Some(id) => {
                    self.session.delete_conversation(&id);
                }
                None => println!("no such conversation"),
            },
            Command::Webhook(url) => self.set_webhook(&url),
            Command::History => println!("{}", self.render_history()),
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
            Command::Send(text) => self.spawn_send(text),
        }
        Flow::Continue
    }

    /// Sends run in the background so the prompt stays usable while the
    /// responder is working.
    fn spawn_send(&self, text: String) {
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            let outcome = session.send(&text).await;
            if let Some(message_id) = outcome.message_id() {
                debug!(message_id = %message_id, "send settled");
            }
            match outcome {
                SendOutcome::Delivered { reply_id, .. } => {
                    match session.messages().iter().find(|m| m.id == reply_id) {
                        Some(reply) => println!("{}", render_message(reply)),
                        None => println!("(a reply arrived in another conversation)"),
                    }
                }
                SendOutcome::Rejected(rejection) => println!("{}", rejection_text(rejection)),
                // Reported through DeliveryFailed by the event printer.
                SendOutcome::Failed { .. } | SendOutcome::Discarded { .. } => {}
            }
        });
    }

    fn set_webhook(&self, url: &str) {
        match self.session.use_webhook(url, &self.config) {
            Ok(()) => println!("webhook saved"),
            Err(e) => {
                warn!(error = %e, "failed to switch webhook");
                println!("could not use that webhook: {e}");
            }
        }
    }

    fn resolve(&self, target: &Target) -> Option<ConversationId> {
        resolve_target(&self.session.conversations(), target)
    }

    fn render_list(&self) -> String {
        render_conversations(
            &self.session.conversations(),
            self.session.active_conversation_id().as_ref(),
        )
    }

    fn render_history(&self) -> String {
        let Some(active) = self.session.active_conversation() else {
            return "no conversation open, use /new or /select".to_string();
        };
        let mut out = format!("== {} ==", active.name);
        for message in self.session.messages() {
            out.push('\n');
            out.push_str(&render_message(&message));
        }
        out
    }
}

/// Print events the user should see regardless of what they typed.
pub async fn print_events(mut events: tokio::sync::broadcast::Receiver<SessionEvent>) {
    use tokio::sync::broadcast::error::RecvError;

    loop {
        match events.recv().await {
            Ok(SessionEvent::DeliveryFailed { reason, .. }) => println!("! {reason}"),
            Ok(SessionEvent::ConversationDeleted { name, .. }) => println!("deleted {name}"),
            Ok(event) => tracing::trace!(event = event.name(), "session event"),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

pub fn resolve_target(conversations: &[Conversation], target: &Target) -> Option<ConversationId> {
    match target {
        Target::Index(n) => n
            .checked_sub(1)
            .and_then(|i| conversations.get(i))
            .map(|c| c.id.clone()),
        Target::Id(id) => conversations
            .iter()
            .find(|c| c.id.as_str() == id)
            .map(|c| c.id.clone()),
    }
}

pub fn render_conversations(conversations: &[Conversation], active: Option<&ConversationId>) -> String {
    if conversations.is_empty() {
        return "no conversations yet, use /new".to_string();
    }
    conversations
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let marker = if Some(&c.id) == active { '*' } else { ' ' };
            format!("{marker}{:>3}. {} [{}] {}  {}", i + 1, c.name, c.time, c.last_message, c.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_message(message: &Message) -> String {
    let who = if message.is_from_user() { ">" } else { "<" };
    match message.status {
        Some(status) => format!("{who} {}  ({status:?})", message.content),
        None => format!("{who} {}", message.content),
    }
}

fn rejection_text(rejection: SendRejection) -> &'static str {
    match rejection {
        SendRejection::EmptyContent => "nothing to send",
        SendRejection::NoActiveConversation => "no conversation open, use /new or /select",
        SendRejection::AwaitingResponse => "still waiting for the previous reply",
    }
}
