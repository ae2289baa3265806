//! Pair and mirroring invariants
//!
//! Pair creation is atomic, so an orphan should be structurally impossible.
//! The report exists to prove that, and to catch a snapshot that was edited
//! or truncated outside the store.

use crate::error::GraphError;
use crate::store::GraphState;
use serde::Serialize;
use std::collections::BTreeMap;
use twin_model::{AbstractedId, OriginalId};

/// Edge counts of one relationship type on both sides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EdgeCounts {
    pub original: usize,
    pub abstracted: usize,
}

/// Structural health of a dual graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub original_nodes: usize,
    pub abstracted_nodes: usize,
    pub trace_edges: usize,
    /// Abstracted nodes with no outgoing trace edge
    pub abstracted_without_trace: Vec<AbstractedId>,
    /// Original nodes with no incoming trace edge
    pub originals_without_trace: Vec<OriginalId>,
    /// Per relationship type
    pub edge_counts: BTreeMap<String, EdgeCounts>,
    /// Original edges with no identical abstracted mirror
    pub unmirrored_edges: Vec<String>,
}

impl IntegrityReport {
    pub(crate) fn compute(state: &GraphState) -> Self {
        let abstracted_without_trace = state
            .abstracted
            .keys()
            .filter(|id| {
                state
                    .trace_to_original
                    .get(*id)
                    .map_or(true, |original| !state.originals.contains_key(original))
            })
            .cloned()
            .collect();
        let originals_without_trace = state
            .originals
            .keys()
            .filter(|id| {
                state
                    .trace_to_abstracted
                    .get(*id)
                    .map_or(true, |abstracted| !state.abstracted.contains_key(abstracted))
            })
            .cloned()
            .collect();

        let mut edge_counts: BTreeMap<String, EdgeCounts> = BTreeMap::new();
        for edge in state.original_edges.values() {
            edge_counts.entry(edge.rel_type.clone()).or_default().original += 1;
        }
        for edge in state.abstracted_edges.values() {
            edge_counts.entry(edge.rel_type.clone()).or_default().abstracted += 1;
        }

        let mut unmirrored_edges = Vec::new();
        for edge in state.original_edges.values() {
            let from = state.trace_to_abstracted.get(&edge.from);
            let to = state.trace_to_abstracted.get(&edge.to);
            let mirrored = match (from, to) {
                (Some(from), Some(to)) => state
                    .abstracted_edges
                    .get(&(from.clone(), to.clone(), edge.rel_type.clone()))
                    .is_some_and(|mirror| mirror.properties == edge.properties),
                _ => false,
            };
            if !mirrored {
                unmirrored_edges.push(format!("{} -[{}]-> {}", edge.from, edge.rel_type, edge.to));
            }
        }

        Self {
            original_nodes: state.originals.len(),
            abstracted_nodes: state.abstracted.len(),
            trace_edges: state.trace_to_original.len(),
            abstracted_without_trace,
            originals_without_trace,
            edge_counts,
            unmirrored_edges,
        }
    }

    /// Whether every invariant holds
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.abstracted_without_trace.is_empty()
            && self.originals_without_trace.is_empty()
            && self.original_nodes == self.abstracted_nodes
            && self.trace_edges == self.original_nodes
            && self.unmirrored_edges.is_empty()
            && self
                .edge_counts
                .values()
                .all(|c| c.original == c.abstracted)
    }

    /// Turn the first violation into a fatal error
    ///
    /// # Errors
    /// [`GraphError::OrphanedPair`] for node/trace violations,
    /// [`GraphError::IsomorphismBroken`] for edge violations
    pub fn check(&self) -> Result<(), GraphError> {
        if let Some(id) = self.abstracted_without_trace.first() {
            return Err(GraphError::OrphanedPair {
                id: id.to_string(),
                detail: "abstracted node without trace edge".into(),
            });
        }
        if let Some(id) = self.originals_without_trace.first() {
            return Err(GraphError::OrphanedPair {
                id: id.to_string(),
                detail: "original node without incoming trace edge".into(),
            });
        }
        if self.original_nodes != self.abstracted_nodes || self.trace_edges != self.original_nodes
        {
            return Err(GraphError::OrphanedPair {
                id: "*".into(),
                detail: format!(
                    "{} original nodes, {} abstracted nodes, {} trace edges",
                    self.original_nodes, self.abstracted_nodes, self.trace_edges
                ),
            });
        }
        if let Some((rel_type, counts)) = self
            .edge_counts
            .iter()
            .find(|(_, c)| c.original != c.abstracted)
        {
            return Err(GraphError::IsomorphismBroken {
                detail: format!(
                    "{rel_type}: {} original edges, {} abstracted edges",
                    counts.original, counts.abstracted
                ),
            });
        }
        if let Some(edge) = self.unmirrored_edges.first() {
            return Err(GraphError::IsomorphismBroken {
                detail: format!("no abstracted mirror for {edge}"),
            });
        }
        Ok(())
    }
}
