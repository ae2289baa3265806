//! Dual-node resource processor
//!
//! Turns one discovered resource into an original/abstracted node pair.
//! Everything that can fail (seed lookup, id abstraction, property
//! abstraction) happens before the store is touched; the commit itself is a
//! single [`DualGraphStore::commit_pair`] call.

use crate::error::GraphError;
use crate::node::{AbstractedNode, OriginalNode};
use crate::store::{CommitOutcome, DualGraphStore};
use std::sync::Arc;
use twin_identity::{IdAbstractor, IdentifierSchema, SeedRegistry};
use twin_model::{AbstractedId, DiscoveredResource, OriginalId, ResourceBody};

/// Outcome of processing one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub original_id: OriginalId,
    pub abstracted_id: AbstractedId,
    pub commit: CommitOutcome,
}

/// Creates node pairs in a [`DualGraphStore`]
#[derive(Debug, Clone)]
pub struct DualNodeProcessor {
    store: Arc<DualGraphStore>,
    registry: Arc<SeedRegistry>,
    abstractor: IdAbstractor,
    schema: Arc<IdentifierSchema>,
}

impl DualNodeProcessor {
    /// Processor with the default abstractor and built-in identifier schema
    #[must_use]
    pub fn new(store: Arc<DualGraphStore>, registry: Arc<SeedRegistry>) -> Self {
        Self {
            store,
            registry,
            abstractor: IdAbstractor::new(),
            schema: Arc::new(IdentifierSchema::azure_defaults()),
        }
    }

    /// With a configured abstractor
    #[inline]
    #[must_use]
    pub fn with_abstractor(mut self, abstractor: IdAbstractor) -> Self {
        self.abstractor = abstractor;
        self
    }

    /// With a configured identifier schema
    #[inline]
    #[must_use]
    pub fn with_schema(mut self, schema: IdentifierSchema) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    /// Target store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<DualGraphStore> {
        &self.store
    }

    /// Materialize the abstracted counterpart without committing it
    ///
    /// # Errors
    /// Returns error if the seed cannot be resolved or any identifier is
    /// invalid
    pub fn abstract_resource(
        &self,
        resource: &DiscoveredResource,
    ) -> Result<AbstractedNode, GraphError> {
        let seed = self.registry.get_or_create_seed(&resource.tenant_id)?;
        let id = self
            .abstractor
            .abstract_id(&seed, resource.original_id.as_str())?;
        let properties = self.schema.abstract_properties(
            &self.abstractor,
            &seed,
            &resource.body.resource_type,
            &resource.body.properties,
        )?;

        Ok(AbstractedNode {
            id,
            body: ResourceBody {
                properties,
                ..resource.body.clone()
            },
        })
    }

    /// Create or update the node pair for one resource
    ///
    /// # Errors
    /// Per-item errors for seed or identifier failures; fatal errors for
    /// invariant violations. No partial pair is ever left behind.
    pub fn process(&self, resource: &DiscoveredResource) -> Result<ProcessOutcome, GraphError> {
        let abstracted = self.abstract_resource(resource)?;
        let abstracted_id = abstracted.id.clone();
        let original = OriginalNode {
            id: resource.original_id.clone(),
            tenant_id: resource.tenant_id.clone(),
            body: resource.body.clone(),
        };

        let commit = self.store.commit_pair(original, abstracted)?;
        tracing::debug!(
            resource_type = %resource.body.resource_type,
            abstracted = %abstracted_id,
            ?commit,
            "committed node pair"
        );

        Ok(ProcessOutcome {
            original_id: resource.original_id.clone(),
            abstracted_id,
            commit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twin_identity::AbstractionError;
    use twin_test_utils as fixtures;

    fn processor() -> DualNodeProcessor {
        DualNodeProcessor::new(
            Arc::new(DualGraphStore::new()),
            Arc::new(SeedRegistry::in_memory()),
        )
    }

    #[test]
    fn creates_pair_with_identical_non_identifying_fields() {
        let processor = processor();
        let resource = fixtures::vm("vm1", &fixtures::nic_id("nic1"));
        let outcome = processor.process(&resource).unwrap();
        assert_eq!(outcome.commit, CommitOutcome::Created);

        let store = processor.store();
        let trace = store.trace();
        let abstracted = trace.abstracted_of(&resource.original_id).unwrap();
        assert_eq!(abstracted.id, outcome.abstracted_id);
        assert_eq!(abstracted.body.name, resource.body.name);
        assert_eq!(abstracted.body.location, resource.body.location);
        assert_eq!(abstracted.body.tags, resource.body.tags);
        assert_eq!(
            abstracted.body.properties["hardwareProfile"],
            resource.body.properties["hardwareProfile"]
        );
        assert_ne!(
            abstracted.body.properties["networkProfile"]["networkInterfaces"][0]["id"],
            resource.body.properties["networkProfile"]["networkInterfaces"][0]["id"]
        );
    }

    #[test]
    fn invalid_identifier_leaves_no_pair() {
        let processor = processor();
        let mut resource = fixtures::vnet("vnet1");
        resource.original_id = OriginalId::new("");

        let result = processor.process(&resource);
        assert!(matches!(
            result,
            Err(GraphError::Abstraction(AbstractionError::InvalidIdentifier { .. }))
        ));
        assert_eq!(processor.store().original().node_count(), 0);
        assert_eq!(processor.store().abstracted().node_count(), 0);
    }

    #[test]
    fn invalid_nested_identifier_leaves_no_pair() {
        let processor = processor();
        let resource = fixtures::nic("nic1", "");
        assert!(processor.process(&resource).is_err());
        assert!(processor.store().trace().is_empty());
    }
}
