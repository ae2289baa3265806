//! Community detection seam
//!
//! The splitter assumes nothing about clustering beyond "disjoint id sets".
//! Any `Fn(&Topology) -> Vec<BTreeSet<AbstractedId>>` can stand in through
//! [`FnDetector`].

use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug};
use twin_graph::Topology;
use twin_model::AbstractedId;

/// Partitions an abstracted topology into communities
pub trait CommunityDetector: Send + Sync + Debug {
    /// Detector name (for logs)
    fn name(&self) -> &str;

    /// Disjoint id sets covering some or all nodes
    fn detect(&self, topology: &Topology) -> Vec<BTreeSet<AbstractedId>>;
}

/// Weakly connected components, largest first
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponentsDetector;

impl CommunityDetector for ConnectedComponentsDetector {
    fn name(&self) -> &str {
        "connected_components"
    }

    fn detect(&self, topology: &Topology) -> Vec<BTreeSet<AbstractedId>> {
        let graph = topology.graph();
        let mut sets = UnionFind::<usize>::new(graph.node_count());
        for edge in graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut components: BTreeMap<usize, BTreeSet<AbstractedId>> = BTreeMap::new();
        for index in graph.node_indices() {
            if let Some(id) = topology.id(index) {
                components
                    .entry(sets.find(index.index()))
                    .or_default()
                    .insert(id.clone());
            }
        }

        let mut out: Vec<BTreeSet<AbstractedId>> = components.into_values().collect();
        out.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.first().cmp(&b.first())));
        tracing::debug!(communities = out.len(), "connected components detected");
        out
    }
}

/// Adapts a plain function into a [`CommunityDetector`]
pub struct FnDetector<F> {
    name: String,
    detect: F,
}

impl<F> FnDetector<F>
where
    F: Fn(&Topology) -> Vec<BTreeSet<AbstractedId>> + Send + Sync,
{
    #[must_use]
    pub fn new(name: impl Into<String>, detect: F) -> Self {
        Self {
            name: name.into(),
            detect,
        }
    }
}

impl<F> Debug for FnDetector<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDetector").field("name", &self.name).finish()
    }
}

impl<F> CommunityDetector for FnDetector<F>
where
    F: Fn(&Topology) -> Vec<BTreeSet<AbstractedId>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, topology: &Topology) -> Vec<BTreeSet<AbstractedId>> {
        (self.detect)(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AbstractedId {
        AbstractedId::new(s)
    }

    fn set(ids: &[&str]) -> BTreeSet<AbstractedId> {
        ids.iter().map(|s| id(s)).collect()
    }

    fn topology() -> Topology {
        Topology::build(
            ["a", "b", "c", "d", "e"].map(id),
            [
                (id("a"), id("b"), "USES".to_string()),
                (id("c"), id("b"), "USES".to_string()),
                (id("d"), id("e"), "CONTAINS".to_string()),
            ],
        )
    }

    #[test]
    fn components_ignore_direction() {
        let detected = ConnectedComponentsDetector.detect(&topology());
        assert_eq!(detected.len(), 2);
        assert_eq!(detected[0], set(&["a", "b", "c"]));
        assert_eq!(detected[1], set(&["d", "e"]));
    }

    #[test]
    fn isolated_nodes_form_singletons() {
        let topology = Topology::build(["x", "y"].map(id), []);
        let detected = ConnectedComponentsDetector.detect(&topology);
        assert_eq!(detected.len(), 2);
        assert!(detected.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn function_detector_is_substitutable() {
        let all_in_one = FnDetector::new("single", |t: &Topology| -> Vec<BTreeSet<AbstractedId>> {
            vec![t.graph().node_weights().cloned().collect()]
        });
        let detected = all_in_one.detect(&topology());
        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].len(), 5);
        assert_eq!(all_in_one.name(), "single");
    }
}
