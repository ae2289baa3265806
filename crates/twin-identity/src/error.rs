//! Identity error types

use std::path::PathBuf;
use twin_model::FieldPathError;

/// Identifier abstraction failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbstractionError {
    /// Empty or malformed identifier; never replaced by a default
    #[error("invalid identifier '{id}': {reason}")]
    InvalidIdentifier {
        /// Offending input
        id: String,
        /// What is wrong with it
        reason: String,
    },

    /// Allowlist entry that does not parse
    #[error("invalid identifier field for '{resource_type}': {source}")]
    InvalidFieldPath {
        /// Resource type the entry was declared for
        resource_type: String,
        /// Parse failure
        #[source]
        source: FieldPathError,
    },
}

impl AbstractionError {
    pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Seed persistence failures
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Blank tenant identifier
    #[error("invalid tenant id '{0}'")]
    InvalidTenant(String),

    /// Stored record cannot be trusted
    #[error("corrupt seed record at {path}: {reason}")]
    Corrupt {
        /// Record file
        path: PathBuf,
        /// Parse or consistency failure
        reason: String,
    },

    /// I/O failure
    #[error("seed store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure
    #[error("seed record serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
