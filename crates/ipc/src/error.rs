//! Protocol encode/decode errors.

#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Message is not valid JSON: {0}")]
    Syntax(String),

    #[error("Message has no action")]
    MissingAction,

    #[error("Unknown action {0:?}")]
    UnknownAction(String),

    #[error("Malformed {action} message: {reason}")]
    Malformed { action: String, reason: String },
}
