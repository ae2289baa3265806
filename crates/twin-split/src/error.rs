//! Split error types

use crate::scan::CrossReference;
use twin_model::ModelError;

fn summarize(violations: &[CrossReference]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised while partitioning a configuration
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// Resources reference resources in another community
    #[error("{} cross-community references: {}", .violations.len(), summarize(.violations))]
    CrossCommunityReference {
        /// Every offending pair, in deterministic order
        violations: Vec<CrossReference>,
    },

    /// One id listed in two communities
    #[error("'{id}' appears in communities {first} and {second}")]
    OverlappingCommunities {
        id: String,
        first: usize,
        second: usize,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SplitError {
    /// Partition violations abort the split; I/O failures may be retried
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CrossCommunityReference { .. } | Self::OverlappingCommunities { .. } | Self::Model(_)
        )
    }

    /// Offending pairs, empty for other errors
    #[must_use]
    pub fn violations(&self) -> &[CrossReference] {
        match self {
            Self::CrossCommunityReference { violations } => violations,
            _ => &[],
        }
    }
}
