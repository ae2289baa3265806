//! Dual graph store
//!
//! Holds both node collections, the trace relation between them, and the
//! relationship edges of each side behind a single lock. Every mutation is
//! one write-lock critical section, so a reader never observes half a pair
//! or an edge mirrored on only one side.

use crate::error::GraphError;
use crate::integrity::IntegrityReport;
use crate::node::{
    AbstractedEdge, AbstractedNode, EdgeKey, OriginalEdge, OriginalNode, RelationshipEdge,
    Representation,
};
use crate::view::{AbstractedView, OriginalView, TraceView};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use twin_model::{AbstractedId, OriginalId};

/// Result of committing a node pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// New pair and trace edge
    Created,
    /// Existing pair updated in place
    Updated,
}

/// Result of mirroring a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// New edge on both sides
    Created,
    /// Existing edge pair had its properties replaced
    Updated,
}

#[derive(Debug, Default)]
pub(crate) struct GraphState {
    pub(crate) originals: BTreeMap<OriginalId, OriginalNode>,
    pub(crate) abstracted: BTreeMap<AbstractedId, AbstractedNode>,
    pub(crate) trace_to_original: BTreeMap<AbstractedId, OriginalId>,
    pub(crate) trace_to_abstracted: BTreeMap<OriginalId, AbstractedId>,
    pub(crate) original_edges: BTreeMap<EdgeKey<OriginalId>, OriginalEdge>,
    pub(crate) abstracted_edges: BTreeMap<EdgeKey<AbstractedId>, AbstractedEdge>,
}

/// Shared, thread-safe dual-representation graph
#[derive(Debug, Default)]
pub struct DualGraphStore {
    state: RwLock<GraphState>,
}

impl DualGraphStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_state(state: GraphState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Atomically insert or update an original/abstracted pair and its trace
    ///
    /// Reprocessing the same original id replaces both node bodies in place.
    ///
    /// # Errors
    /// - [`GraphError::AbstractedIdCollision`] if the abstracted id already
    ///   traces to a different original
    /// - [`GraphError::OrphanedPair`] if either node exists without its
    ///   counterpart, or the original already traces to another abstracted id
    ///
    /// On error nothing is written.
    pub fn commit_pair(
        &self,
        original: OriginalNode,
        abstracted: AbstractedNode,
    ) -> Result<CommitOutcome, GraphError> {
        let mut state = self.state.write();

        let existing_trace = state.trace_to_abstracted.get(&original.id).cloned();
        let outcome = match existing_trace {
            Some(traced) if traced == abstracted.id => CommitOutcome::Updated,
            Some(traced) => {
                let err = GraphError::OrphanedPair {
                    id: original.id.to_string(),
                    detail: format!(
                        "already traced from '{traced}', reprocessing produced '{}'",
                        abstracted.id
                    ),
                };
                tracing::error!(error = %err, "refusing pair commit");
                return Err(err);
            }
            None => {
                if let Some(existing) = state.trace_to_original.get(&abstracted.id) {
                    let err = GraphError::AbstractedIdCollision {
                        abstracted: abstracted.id.clone(),
                        existing: existing.clone(),
                        incoming: original.id.clone(),
                    };
                    tracing::error!(error = %err, "refusing pair commit");
                    return Err(err);
                }
                if state.originals.contains_key(&original.id)
                    || state.abstracted.contains_key(&abstracted.id)
                {
                    let err = GraphError::OrphanedPair {
                        id: original.id.to_string(),
                        detail: "node present without trace edge".to_string(),
                    };
                    tracing::error!(error = %err, "refusing pair commit");
                    return Err(err);
                }
                CommitOutcome::Created
            }
        };

        if outcome == CommitOutcome::Created {
            state
                .trace_to_original
                .insert(abstracted.id.clone(), original.id.clone());
            state
                .trace_to_abstracted
                .insert(original.id.clone(), abstracted.id.clone());
        }
        state.originals.insert(original.id.clone(), original);
        state.abstracted.insert(abstracted.id.clone(), abstracted);

        Ok(outcome)
    }

    /// Create (or update) a relationship on both sides in one step
    ///
    /// Both endpoints are resolved to their abstracted counterparts through
    /// the trace relation; the abstracted edge carries the same type and a
    /// copy of the properties.
    ///
    /// # Errors
    /// Returns [`GraphError::MissingEndpoint`] if either endpoint has no
    /// committed pair; nothing is written
    pub fn link_pair(
        &self,
        from: &OriginalId,
        to: &OriginalId,
        rel_type: &str,
        properties: Map<String, Value>,
    ) -> Result<LinkOutcome, GraphError> {
        let mut state = self.state.write();

        let missing = |id: &OriginalId| GraphError::MissingEndpoint {
            missing: id.clone(),
            from: from.clone(),
            to: to.clone(),
            rel_type: rel_type.to_string(),
        };
        let abs_from = state
            .trace_to_abstracted
            .get(from)
            .cloned()
            .ok_or_else(|| missing(from))?;
        let abs_to = state
            .trace_to_abstracted
            .get(to)
            .cloned()
            .ok_or_else(|| missing(to))?;

        let original = RelationshipEdge {
            from: from.clone(),
            to: to.clone(),
            rel_type: rel_type.to_string(),
            properties: properties.clone(),
        };
        let abstracted = RelationshipEdge {
            from: abs_from,
            to: abs_to,
            rel_type: rel_type.to_string(),
            properties,
        };

        let previous = state.original_edges.insert(original.key(), original);
        state.abstracted_edges.insert(abstracted.key(), abstracted);

        Ok(if previous.is_some() {
            LinkOutcome::Updated
        } else {
            LinkOutcome::Created
        })
    }

    /// Abstracted nodes: the default query path
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> AbstractedView<'_> {
        self.abstracted()
    }

    /// Explicit query path over abstracted nodes and edges
    #[must_use]
    pub fn abstracted(&self) -> AbstractedView<'_> {
        AbstractedView::new(self.state.read())
    }

    /// Explicit query path over original nodes and edges
    #[must_use]
    pub fn original(&self) -> OriginalView<'_> {
        OriginalView::new(self.state.read())
    }

    /// Query path across the trace relation
    #[must_use]
    pub fn trace(&self) -> TraceView<'_> {
        TraceView::new(self.state.read())
    }

    /// Node count of one representation
    #[must_use]
    pub fn node_count(&self, representation: Representation) -> usize {
        let state = self.state.read();
        match representation {
            Representation::Original => state.originals.len(),
            Representation::Abstracted => state.abstracted.len(),
        }
    }

    /// Structural health of the dual graph
    #[must_use]
    pub fn integrity_report(&self) -> IntegrityReport {
        IntegrityReport::compute(&self.state.read())
    }

    /// Check every pair and mirroring invariant
    ///
    /// # Errors
    /// Returns the first invariant violation as a fatal error
    pub fn verify(&self) -> Result<IntegrityReport, GraphError> {
        let report = self.integrity_report();
        report.check()?;
        Ok(report)
    }

    pub(crate) fn read_state(&self) -> parking_lot::RwLockReadGuard<'_, GraphState> {
        self.state.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twin_model::{ResourceBody, TenantId};

    fn pair(original: &str, abstracted: &str) -> (OriginalNode, AbstractedNode) {
        let body = ResourceBody::new("t", "n");
        (
            OriginalNode {
                id: OriginalId::new(original),
                tenant_id: TenantId::new("tenant"),
                body: body.clone(),
            },
            AbstractedNode {
                id: AbstractedId::new(abstracted),
                body,
            },
        )
    }

    #[test]
    fn commit_is_idempotent() {
        let store = DualGraphStore::new();
        let (o, a) = pair("o1", "a1");
        assert_eq!(store.commit_pair(o.clone(), a.clone()).unwrap(), CommitOutcome::Created);

        let mut updated = o;
        updated.body.location = Some("northeurope".into());
        assert_eq!(store.commit_pair(updated, a).unwrap(), CommitOutcome::Updated);

        assert_eq!(store.original().node_count(), 1);
        assert_eq!(store.abstracted().node_count(), 1);
        assert_eq!(
            store
                .original()
                .node(&OriginalId::new("o1"))
                .and_then(|n| n.body.location.clone()),
            Some("northeurope".into())
        );
    }

    #[test]
    fn collision_is_rejected_without_writes() {
        let store = DualGraphStore::new();
        let (o1, a1) = pair("o1", "shared");
        let (o2, a2) = pair("o2", "shared");
        store.commit_pair(o1, a1).unwrap();

        let result = store.commit_pair(o2, a2);
        assert!(matches!(result, Err(GraphError::AbstractedIdCollision { .. })));
        assert_eq!(store.original().node_count(), 1);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn changed_abstraction_is_an_orphan_risk() {
        let store = DualGraphStore::new();
        let (o, a) = pair("o1", "a1");
        store.commit_pair(o.clone(), a).unwrap();

        let (_, other) = pair("o1", "a2");
        let result = store.commit_pair(o, other);
        assert!(matches!(result, Err(GraphError::OrphanedPair { .. })));
        assert_eq!(store.abstracted().node_count(), 1);
    }

    #[test]
    fn link_requires_both_endpoints() {
        let store = DualGraphStore::new();
        let (o, a) = pair("o1", "a1");
        store.commit_pair(o, a).unwrap();

        let result = store.link_pair(
            &OriginalId::new("o1"),
            &OriginalId::new("ghost"),
            "CONTAINS",
            Map::new(),
        );
        match result {
            Err(GraphError::MissingEndpoint { missing, .. }) => {
                assert_eq!(missing, OriginalId::new("ghost"));
            }
            other => panic!("expected MissingEndpoint, got {other:?}"),
        }
        assert_eq!(store.original().edge_count(), 0);
        assert_eq!(store.abstracted().edge_count(), 0);
    }

    #[test]
    fn relink_replaces_properties_on_both_sides() {
        let store = DualGraphStore::new();
        for (o, a) in [pair("o1", "a1"), pair("o2", "a2")] {
            store.commit_pair(o, a).unwrap();
        }
        let from = OriginalId::new("o1");
        let to = OriginalId::new("o2");

        let mut props = Map::new();
        props.insert("weight".into(), Value::from(1));
        assert_eq!(
            store.link_pair(&from, &to, "USES", props.clone()).unwrap(),
            LinkOutcome::Created
        );
        props.insert("weight".into(), Value::from(2));
        assert_eq!(
            store.link_pair(&from, &to, "USES", props).unwrap(),
            LinkOutcome::Updated
        );

        let view = store.abstracted();
        let edges: Vec<_> = view.edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].properties.get("weight"), Some(&Value::from(2)));
        assert_eq!(edges[0].from, AbstractedId::new("a1"));
    }
}
