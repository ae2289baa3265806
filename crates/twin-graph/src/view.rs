//! Query paths
//!
//! Three read-only views, each holding a read lock for its lifetime:
//!
//! - [`AbstractedView`]: synthetic nodes and edges (the default)
//! - [`OriginalView`]: real nodes and edges, only when explicitly asked for
//! - [`TraceView`]: crossing from one side to the other
//!
//! No view hands out a node whose representation is ambiguous.

use crate::node::{AbstractedEdge, AbstractedNode, OriginalEdge, OriginalNode, TraceEdge};
use crate::store::GraphState;
use crate::topology::Topology;
use parking_lot::RwLockReadGuard;
use std::collections::BTreeMap;
use twin_model::{AbstractedId, OriginalId};

/// Read-only access to the abstracted representation
pub struct AbstractedView<'a> {
    state: RwLockReadGuard<'a, GraphState>,
}

impl<'a> AbstractedView<'a> {
    pub(crate) fn new(state: RwLockReadGuard<'a, GraphState>) -> Self {
        Self { state }
    }

    /// Look up one node
    #[must_use]
    pub fn node(&self, id: &AbstractedId) -> Option<&AbstractedNode> {
        self.state.abstracted.get(id)
    }

    /// All nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = &AbstractedNode> {
        self.state.abstracted.values()
    }

    /// All relationship edges in `(from, to, type)` order
    pub fn edges(&self) -> impl Iterator<Item = &AbstractedEdge> {
        self.state.abstracted_edges.values()
    }

    /// Edges of one relationship type
    pub fn edges_of_type<'s>(
        &'s self,
        rel_type: &'s str,
    ) -> impl Iterator<Item = &'s AbstractedEdge> + 's {
        self.edges().filter(move |e| e.rel_type == rel_type)
    }

    /// Outgoing edges of a node
    pub fn outgoing<'s>(
        &'s self,
        id: &'s AbstractedId,
    ) -> impl Iterator<Item = &'s AbstractedEdge> + 's {
        self.edges().filter(move |e| &e.from == id)
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.abstracted.len()
    }

    /// Number of relationship edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.state.abstracted_edges.len()
    }

    /// Edge count per relationship type
    #[must_use]
    pub fn edge_counts(&self) -> BTreeMap<String, usize> {
        count_by_type(self.edges().map(|e| e.rel_type.as_str()))
    }

    /// Directed graph over abstracted ids, for community detection
    #[must_use]
    pub fn topology(&self) -> Topology {
        Topology::build(
            self.state.abstracted.keys().cloned(),
            self.edges()
                .map(|e| (e.from.clone(), e.to.clone(), e.rel_type.clone())),
        )
    }
}

/// Read-only access to the original representation
pub struct OriginalView<'a> {
    state: RwLockReadGuard<'a, GraphState>,
}

impl<'a> OriginalView<'a> {
    pub(crate) fn new(state: RwLockReadGuard<'a, GraphState>) -> Self {
        Self { state }
    }

    /// Look up one node
    #[must_use]
    pub fn node(&self, id: &OriginalId) -> Option<&OriginalNode> {
        self.state.originals.get(id)
    }

    /// All nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = &OriginalNode> {
        self.state.originals.values()
    }

    /// All relationship edges in `(from, to, type)` order
    pub fn edges(&self) -> impl Iterator<Item = &OriginalEdge> {
        self.state.original_edges.values()
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.originals.len()
    }

    /// Number of relationship edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.state.original_edges.len()
    }

    /// Edge count per relationship type
    #[must_use]
    pub fn edge_counts(&self) -> BTreeMap<String, usize> {
        count_by_type(self.edges().map(|e| e.rel_type.as_str()))
    }
}

/// Read-only access across the trace relation
pub struct TraceView<'a> {
    state: RwLockReadGuard<'a, GraphState>,
}

impl<'a> TraceView<'a> {
    pub(crate) fn new(state: RwLockReadGuard<'a, GraphState>) -> Self {
        Self { state }
    }

    /// Original counterpart of an abstracted node
    #[must_use]
    pub fn original_of(&self, id: &AbstractedId) -> Option<&OriginalNode> {
        let original = self.state.trace_to_original.get(id)?;
        self.state.originals.get(original)
    }

    /// Abstracted counterpart of an original node
    #[must_use]
    pub fn abstracted_of(&self, id: &OriginalId) -> Option<&AbstractedNode> {
        let abstracted = self.state.trace_to_abstracted.get(id)?;
        self.state.abstracted.get(abstracted)
    }

    /// All trace edges in abstracted-id order
    pub fn edges(&self) -> impl Iterator<Item = TraceEdge> + '_ {
        self.state
            .trace_to_original
            .iter()
            .map(|(from, to)| TraceEdge {
                from: from.clone(),
                to: to.clone(),
            })
    }

    /// Number of trace edges
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.trace_to_original.len()
    }

    /// Whether no pair has been committed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.trace_to_original.is_empty()
    }
}

fn count_by_type<'a>(types: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for rel_type in types {
        *counts.entry(rel_type.to_string()).or_insert(0) += 1;
    }
    counts
}
