/// Application name
pub const APP_NAME: &str = "Parley";

/// Storage record holding the serialized conversation list
pub const CONVERSATIONS_KEY: &str = "conversations";

/// Storage record holding the map of conversation id -> message log
pub const MESSAGE_HISTORY_KEY: &str = "messageHistory";

/// Storage record holding the configured webhook URL
pub const WEBHOOK_URL_KEY: &str = "n8n_webhook_url";

/// Storage record holding the stable session id sent with every payload
pub const SESSION_ID_KEY: &str = "chat_session_id";

/// Preview shown for a conversation that has no messages yet
pub const NEW_CONVERSATION_PREVIEW: &str = "New conversation";

/// Reply text used when the responder succeeds without returning any text
pub const FALLBACK_REPLY: &str = "Message received";

/// Failure reason used when the responder call itself blows up
pub const GENERIC_FAILURE_REASON: &str = "Failed to process your message. Please try again.";

/// Failure reason for transport-level errors
pub const NETWORK_FAILURE_REASON: &str =
    "Failed to connect to the workflow. Please check your network connection.";

/// Default responder timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default payload metadata
pub const DEFAULT_PLATFORM: &str = "testing";
pub const DEFAULT_USER_ID: &str = "user123";
pub const DEFAULT_USER_NAME: &str = "Test User";

/// Capacity of the session event broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
