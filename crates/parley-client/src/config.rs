//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client starts with zero
//! configuration; without a webhook URL the simulated responder is used.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use parley_shared::constants::{
    DEFAULT_PLATFORM, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_ID, DEFAULT_USER_NAME,
};
use parley_store::{ChatStore, KeyValueStore};

use crate::error::Result;
use crate::responder::{
    validate_webhook_url, Responder, SimulatedResponder, WebhookConfig, WebhookResponder,
};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Automation workflow endpoint.
    /// Env: `PARLEY_WEBHOOK_URL`
    /// Default: none (stored setting, then simulated responder).
    pub webhook_url: Option<String>,

    /// SQLite database file.
    /// Env: `PARLEY_DB_PATH`
    /// Default: none (platform data directory).
    pub database_path: Option<PathBuf>,

    /// Whole-request timeout for the webhook.
    /// Env: `PARLEY_REQUEST_TIMEOUT_SECS`
    /// Default: 30 seconds.
    pub request_timeout: Duration,

    /// Payload metadata.
    /// Env: `PARLEY_PLATFORM`, `PARLEY_USER_ID`, `PARLEY_USER_NAME`
    pub platform: String,
    pub user_id: String,
    pub user_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            database_path: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            platform: DEFAULT_PLATFORM.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            user_name: DEFAULT_USER_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("PARLEY_WEBHOOK_URL").filter(|u| !u.trim().is_empty()) {
            match validate_webhook_url(&url) {
                Ok(_) => config.webhook_url = Some(url.trim().to_string()),
                Err(e) => warn!(value = %url, error = %e, "Invalid PARLEY_WEBHOOK_URL, ignoring"),
            }
        }

        if let Some(path) = lookup("PARLEY_DB_PATH").filter(|p| !p.is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(val) = lookup("PARLEY_REQUEST_TIMEOUT_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => warn!(value = %val, "Invalid PARLEY_REQUEST_TIMEOUT_SECS, using default"),
            }
        }

        if let Some(platform) = lookup("PARLEY_PLATFORM").filter(|v| !v.is_empty()) {
            config.platform = platform;
        }
        if let Some(user_id) = lookup("PARLEY_USER_ID").filter(|v| !v.is_empty()) {
            config.user_id = user_id;
        }
        if let Some(user_name) = lookup("PARLEY_USER_NAME").filter(|v| !v.is_empty()) {
            config.user_name = user_name;
        }

        config
    }

    /// The webhook to use: the environment wins over the stored setting.
    pub fn resolve_webhook_url<B: KeyValueStore>(&self, store: &ChatStore<B>) -> Option<String> {
        self.webhook_url.clone().or_else(|| store.webhook_url())
    }

    pub fn webhook_config(&self, url: impl Into<String>, session_id: impl Into<String>) -> WebhookConfig {
        WebhookConfig {
            url: url.into(),
            timeout: self.request_timeout,
            platform: self.platform.clone(),
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            session_id: session_id.into(),
        }
    }

    /// Build the webhook responder for `url`, tagged with the store's
    /// session id.
    pub fn webhook_responder<B: KeyValueStore>(
        &self,
        url: &str,
        store: &ChatStore<B>,
    ) -> Result<WebhookResponder> {
        let session_id = store.session_id()?;
        WebhookResponder::new(self.webhook_config(url, session_id))
    }

    /// The responder this configuration calls for: the webhook if one is
    /// configured and valid, the simulated responder otherwise.
    pub fn responder<B: KeyValueStore>(&self, store: &ChatStore<B>) -> Arc<dyn Responder> {
        let Some(url) = self.resolve_webhook_url(store) else {
            info!("no webhook configured, using simulated responder");
            return Arc::new(SimulatedResponder::new());
        };

        match self.webhook_responder(&url, store) {
            Ok(responder) => {
                info!(url = %responder.url(), "using webhook responder");
                Arc::new(responder)
            }
            Err(e) => {
                warn!(error = %e, "webhook unusable, falling back to simulated responder");
                Arc::new(SimulatedResponder::new())
            }
        }
    }
}
