//! Relationship duplicator
//!
//! Mirrors a discovered relationship onto both representations. Endpoints
//! must already have committed pairs; a relationship is never attached to a
//! single-sided stub.

use crate::error::GraphError;
use crate::store::{DualGraphStore, LinkOutcome};
use serde_json::{Map, Value};
use std::sync::Arc;
use twin_model::{DiscoveredRelationship, OriginalId};

/// Creates relationship edges on both sides of a [`DualGraphStore`]
#[derive(Debug, Clone)]
pub struct RelationshipDuplicator {
    store: Arc<DualGraphStore>,
}

impl RelationshipDuplicator {
    #[must_use]
    pub fn new(store: Arc<DualGraphStore>) -> Self {
        Self { store }
    }

    /// Link two original resources and their abstracted counterparts
    ///
    /// # Errors
    /// Returns [`GraphError::MissingEndpoint`] if either endpoint has not
    /// been processed
    pub fn link(
        &self,
        from: &OriginalId,
        to: &OriginalId,
        rel_type: &str,
        properties: Map<String, Value>,
    ) -> Result<LinkOutcome, GraphError> {
        let outcome = self.store.link_pair(from, to, rel_type, properties)?;
        tracing::debug!(%rel_type, ?outcome, "mirrored relationship");
        Ok(outcome)
    }

    /// Link a discovered relationship record
    ///
    /// # Errors
    /// See [`RelationshipDuplicator::link`]
    pub fn duplicate(&self, relationship: &DiscoveredRelationship) -> Result<LinkOutcome, GraphError> {
        self.link(
            &relationship.from_id,
            &relationship.to_id,
            &relationship.rel_type,
            relationship.properties.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::DualNodeProcessor;
    use twin_identity::SeedRegistry;
    use twin_test_utils as fixtures;

    #[test]
    fn mirrors_type_and_properties() {
        let store = Arc::new(DualGraphStore::new());
        let processor =
            DualNodeProcessor::new(Arc::clone(&store), Arc::new(SeedRegistry::in_memory()));
        for resource in fixtures::sample_resources() {
            processor.process(&resource).unwrap();
        }

        let duplicator = RelationshipDuplicator::new(Arc::clone(&store));
        let relationship = &fixtures::sample_relationships()[1];
        assert_eq!(duplicator.duplicate(relationship).unwrap(), LinkOutcome::Created);

        let trace = store.trace();
        let abs_from = trace.abstracted_of(&relationship.from_id).unwrap().id.clone();
        drop(trace);

        let view = store.abstracted();
        let edge = view.outgoing(&abs_from).next().unwrap();
        assert_eq!(edge.rel_type, "CONNECTED_TO");
        assert_eq!(edge.properties, relationship.properties);
    }

    #[test]
    fn unprocessed_endpoint_is_reported() {
        let store = Arc::new(DualGraphStore::new());
        let duplicator = RelationshipDuplicator::new(store);
        let result = duplicator.duplicate(&fixtures::sample_relationships()[0]);
        assert!(matches!(result, Err(GraphError::MissingEndpoint { .. })));
    }
}
