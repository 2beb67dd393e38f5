//! Error type for the host bridge.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("bridge I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed bridge message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("host rejected `{action}`: {message}")]
    Remote { action: String, message: String },

    #[error("`{action}` timed out after {timeout:?}")]
    Timeout { action: String, timeout: Duration },

    #[error("bridge connection closed")]
    Closed,

    #[error("no handler registered for host command `{0}`")]
    UnknownCommand(String),

    #[error("invalid parameters for `{command}`: {reason}")]
    InvalidParams { command: String, reason: String },
}

pub type Result<T> = std::result::Result<T, BridgeError>;
