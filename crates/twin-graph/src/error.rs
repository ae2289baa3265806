//! Graph error types

use twin_identity::{AbstractionError, SeedError};
use twin_model::{AbstractedId, OriginalId};

/// Errors raised by the dual graph and its ingestion services
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Identifier could not be abstracted
    #[error(transparent)]
    Abstraction(#[from] AbstractionError),

    /// Tenant seed could not be resolved
    #[error(transparent)]
    Seed(#[from] SeedError),

    /// Relationship endpoint has no committed pair yet
    #[error("missing endpoint '{missing}' for {rel_type} relationship {from} -> {to}")]
    MissingEndpoint {
        /// Endpoint that is not in the graph
        missing: OriginalId,
        /// Source of the relationship
        from: OriginalId,
        /// Target of the relationship
        to: OriginalId,
        /// Relationship type
        rel_type: String,
    },

    /// One side of a pair exists without its counterpart
    #[error("orphaned pair at '{id}': {detail}")]
    OrphanedPair {
        /// Identifier of the node that lost its counterpart
        id: String,
        /// What was found
        detail: String,
    },

    /// Two originals would share one abstracted id
    #[error("abstracted id '{abstracted}' already traces to '{existing}', refusing '{incoming}'")]
    AbstractedIdCollision {
        /// Colliding synthetic id
        abstracted: AbstractedId,
        /// Original already traced by it
        existing: OriginalId,
        /// Original that would collide
        incoming: OriginalId,
    },

    /// Relationship edges no longer mirror each other
    #[error("representations are not isomorphic: {detail}")]
    IsomorphismBroken {
        /// First mismatch found
        detail: String,
    },

    /// Snapshot file I/O failure
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization failure
    #[error("snapshot serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    /// Invariant violations that must stop the whole operation
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::OrphanedPair { .. }
                | Self::AbstractedIdCollision { .. }
                | Self::IsomorphismBroken { .. }
        )
    }

    /// Failures scoped to a single resource or relationship
    #[inline]
    #[must_use]
    pub fn is_per_item(&self) -> bool {
        !self.is_fatal()
    }
}
