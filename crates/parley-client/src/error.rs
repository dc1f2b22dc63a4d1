use parley_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the client crate.
///
/// None of the session operations return these: they are for setup paths
/// (opening the store, building an HTTP client, validating settings).
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid webhook URL: {0}")]
    InvalidWebhookUrl(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
