use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body POSTed to the automation webhook for every outgoing message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Free-form platform tag
    pub platform: String,
    pub user_id: String,
    pub user_name: String,
    /// Raw message text as typed by the user
    pub message: String,
    /// Unix epoch milliseconds at dispatch time
    pub timestamp: i64,
    pub conversation_id: String,
    /// Stable per-installation session id
    pub session_id: String,
}

/// Object fields that may carry the workflow's reply, in lookup order.
const REPLY_FIELDS: [&str; 5] = ["output", "reply", "response", "message", "text"];

/// Pull the reply text out of a webhook response body.
///
/// Workflows answer in several shapes: a JSON string, an object with one
/// of the [`REPLY_FIELDS`], an array whose first element is one of those,
/// or plain text.  `None` means the workflow answered without any text.
pub fn extract_reply(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => reply_from_value(&value),
        Err(_) => Some(body.to_string()),
    }
}

fn reply_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Object(map) => REPLY_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str).and_then(non_empty)),
        Value::Array(items) => items.first().and_then(reply_from_value),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
