//! # parley
//!
//! Terminal front-end for a Parley chat session.
//!
//! Conversations and their history live in a local SQLite database.
//! Messages go to the configured automation webhook, or to a simulated
//! responder when none is set.

mod commands;
mod repl;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use parley_client::{ChatSession, ClientConfig};
use parley_shared::constants::APP_NAME;
use parley_store::{ChatStore, Database};

use crate::repl::Repl;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("parley_cli=info,parley_client=info,parley_store=warn,warn")
        }))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting {} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the store and pick a responder
    // -----------------------------------------------------------------------
    let db = match &config.database_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };
    info!(path = ?db.path(), "Database opened");

    let store = ChatStore::new(db);
    let responder = config.responder(&store);
    let session = Arc::new(ChatSession::open(store, responder));

    // -----------------------------------------------------------------------
    // 4. Run until stdin closes, /quit or Ctrl+C
    // -----------------------------------------------------------------------
    tokio::spawn(repl::print_events(session.subscribe()));

    let repl = Repl::new(Arc::clone(&session), config);
    tokio::select! {
        result = repl.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
