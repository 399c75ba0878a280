//! Error types for the finder bot.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dialog error: {0}")]
    Dialog(#[from] DialogError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Send API error: {0}")]
    Send(#[from] SendError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Dialog state machine errors.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Question {index} does not exist in the catalog")]
    UnknownQuestion { index: usize },

    #[error("Answer {answer} is out of range for question {question} ({choices} choices)")]
    InvalidAnswer {
        question: usize,
        answer: usize,
        choices: usize,
    },
}

/// Inbound webhook errors.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Missing X-Hub-Signature header")]
    MissingSignature,

    #[error("Malformed X-Hub-Signature header: {0}")]
    MalformedSignature(String),

    #[error("Request signature does not match the payload")]
    SignatureMismatch,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Send API errors.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Send API request failed: {0}")]
    RequestFailed(String),

    #[error("Send API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Send API request timed out")]
    Timeout,
}

/// People-search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid search response: {0}")]
    InvalidResponse(String),

    #[error("Search request timed out")]
    Timeout,
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
