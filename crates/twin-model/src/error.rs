//! Model error types

/// Errors raised while reading model inputs
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Configuration tree has the wrong shape
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed `type.name` address
    #[error("invalid resource address: '{0}'")]
    InvalidAddress(String),

    /// JSON parse/serialize failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
