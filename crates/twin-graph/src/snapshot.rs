//! Serializable snapshot of the whole dual graph
//!
//! Lets an out-of-process emitter read the persisted graph. Restoring a
//! snapshot re-checks every invariant before the store is handed out.

use crate::error::GraphError;
use crate::node::{AbstractedEdge, AbstractedNode, OriginalEdge, OriginalNode, TraceEdge};
use crate::store::{DualGraphStore, GraphState};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Current snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// All three collections of a [`DualGraphStore`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub version: u32,
    pub originals: Vec<OriginalNode>,
    pub abstracted: Vec<AbstractedNode>,
    pub traces: Vec<TraceEdge>,
    pub original_edges: Vec<OriginalEdge>,
    pub abstracted_edges: Vec<AbstractedEdge>,
}

impl GraphSnapshot {
    /// Write as pretty JSON
    ///
    /// # Errors
    /// Returns error on I/O or serialization failure
    pub fn save(&self, path: &Path) -> Result<(), GraphError> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Read from JSON
    ///
    /// # Errors
    /// Returns error on I/O or parse failure
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let reader = BufReader::new(fs::File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl DualGraphStore {
    /// Copy every node, trace, and edge out of the store
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        let state = self.read_state();
        GraphSnapshot {
            version: SNAPSHOT_VERSION,
            originals: state.originals.values().cloned().collect(),
            abstracted: state.abstracted.values().cloned().collect(),
            traces: state
                .trace_to_original
                .iter()
                .map(|(from, to)| TraceEdge {
                    from: from.clone(),
                    to: to.clone(),
                })
                .collect(),
            original_edges: state.original_edges.values().cloned().collect(),
            abstracted_edges: state.abstracted_edges.values().cloned().collect(),
        }
    }

    /// Rebuild a store from a snapshot
    ///
    /// # Errors
    /// Returns [`GraphError::OrphanedPair`] or
    /// [`GraphError::IsomorphismBroken`] if the snapshot violates a pair or
    /// mirroring invariant, or has an unknown version
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(GraphError::OrphanedPair {
                id: "*".into(),
                detail: format!("unsupported snapshot version {}", snapshot.version),
            });
        }

        let mut state = GraphState::default();
        for node in snapshot.originals {
            state.originals.insert(node.id.clone(), node);
        }
        for node in snapshot.abstracted {
            state.abstracted.insert(node.id.clone(), node);
        }
        for trace in snapshot.traces {
            state
                .trace_to_abstracted
                .insert(trace.to.clone(), trace.from.clone());
            state.trace_to_original.insert(trace.from, trace.to);
        }
        for edge in snapshot.original_edges {
            state.original_edges.insert(edge.key(), edge);
        }
        for edge in snapshot.abstracted_edges {
            state.abstracted_edges.insert(edge.key(), edge);
        }

        let store = Self::from_state(state);
        let report = store.verify()?;
        tracing::debug!(
            nodes = report.original_nodes,
            edges = report.edge_counts.len(),
            "restored graph snapshot"
        );
        Ok(store)
    }

    /// Save a snapshot to `path`
    ///
    /// # Errors
    /// Returns error on I/O or serialization failure
    pub fn save_snapshot(&self, path: &Path) -> Result<(), GraphError> {
        self.snapshot().save(path)
    }

    /// Load and verify a store from `path`
    ///
    /// # Errors
    /// Returns error on I/O, parse, or invariant failure
    pub fn load_snapshot(path: &Path) -> Result<Self, GraphError> {
        Self::from_snapshot(GraphSnapshot::load(path)?)
    }
}
