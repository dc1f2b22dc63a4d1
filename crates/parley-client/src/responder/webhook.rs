use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use tracing::{info, warn};

use parley_shared::constants::{
    DEFAULT_PLATFORM, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_ID, DEFAULT_USER_NAME,
    NETWORK_FAILURE_REASON,
};
use parley_shared::protocol::{extract_reply, WebhookPayload};

use super::{Responder, ResponderOutcome, ResponderRequest};
use crate::error::{ClientError, Result};

/// Everything the webhook responder needs to build a request.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    /// Whole-request timeout (connect + response body).
    pub timeout: Duration,
    pub platform: String,
    pub user_id: String,
    pub user_name: String,
    pub session_id: String,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            platform: DEFAULT_PLATFORM.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            user_name: DEFAULT_USER_NAME.to_string(),
            session_id: session_id.into(),
        }
    }
}

/// Check that `url` is a usable http(s) webhook endpoint.
pub fn validate_webhook_url(url: &str) -> Result<Url> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ClientError::InvalidWebhookUrl(
            "please enter your webhook URL".into(),
        ));
    }

    let parsed = Url::parse(url).map_err(|e| ClientError::InvalidWebhookUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ClientError::InvalidWebhookUrl(format!(
            "unsupported scheme `{other}`"
        ))),
    }
}

/// Forwards every outgoing message to an automation workflow webhook and
/// turns its HTTP answer into a [`ResponderOutcome`].
pub struct WebhookResponder {
    client: reqwest::Client,
    url: Url,
    config: WebhookConfig,
}

impl WebhookResponder {
    pub fn new(config: WebhookConfig) -> Result<Self> {
        let url = validate_webhook_url(&config.url)?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, url, config })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn payload(&self, request: &ResponderRequest) -> WebhookPayload {
        WebhookPayload {
            platform: self.config.platform.clone(),
            user_id: self.config.user_id.clone(),
            user_name: self.config.user_name.clone(),
            message: request.text.clone(),
            timestamp: Utc::now().timestamp_millis(),
            conversation_id: request.conversation_id.to_string(),
            session_id: self.config.session_id.clone(),
        }
    }

    fn transport_failure(&self, error: &reqwest::Error) -> ResponderOutcome {
        if error.is_timeout() {
            warn!(timeout = ?self.config.timeout, "webhook request timed out");
            ResponderOutcome::failed(format!(
                "The workflow timed out after {}s",
                self.config.timeout.as_secs_f32()
            ))
        } else {
            warn!(error = %error, "webhook request failed");
            ResponderOutcome::failed(NETWORK_FAILURE_REASON)
        }
    }
}

#[async_trait]
impl Responder for WebhookResponder {
    async fn send(&self, request: &ResponderRequest) -> ResponderOutcome {
        info!(
            conversation_id = %request.conversation_id,
            url = %self.url,
            "dispatching message to webhook"
        );

        let response = match self
            .client
            .post(self.url.clone())
            .json(&self.payload(request))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return self.transport_failure(&e),
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "webhook answered with an error status");
            return ResponderOutcome::failed(format!(
                "Webhook responded with status {}",
                status.as_u16()
            ));
        }

        match response.text().await {
            Ok(body) => ResponderOutcome::Delivered {
                reply: extract_reply(&body),
            },
            Err(e) => self.transport_failure(&e),
        }
    }
}
