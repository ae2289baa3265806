//! Abstracted topology as a petgraph graph

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use twin_model::AbstractedId;

/// Directed graph of abstracted ids with relationship types on the edges
#[derive(Debug, Clone, Default)]
pub struct Topology {
    graph: DiGraph<AbstractedId, String>,
    index: HashMap<AbstractedId, NodeIndex>,
}

impl Topology {
    /// Build from node ids and `(from, to, type)` triples
    ///
    /// Edges naming an unknown node are skipped.
    #[must_use]
    pub fn build(
        nodes: impl IntoIterator<Item = AbstractedId>,
        edges: impl IntoIterator<Item = (AbstractedId, AbstractedId, String)>,
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for id in nodes {
            index
                .entry(id.clone())
                .or_insert_with(|| graph.add_node(id));
        }
        for (from, to, rel_type) in edges {
            if let (Some(&a), Some(&b)) = (index.get(&from), index.get(&to)) {
                graph.add_edge(a, b, rel_type);
            }
        }
        Self { graph, index }
    }

    /// Underlying graph
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &DiGraph<AbstractedId, String> {
        &self.graph
    }

    /// Graph index of an id
    #[inline]
    #[must_use]
    pub fn node_index(&self, id: &AbstractedId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Id at a graph index
    #[inline]
    #[must_use]
    pub fn id(&self, index: NodeIndex) -> Option<&AbstractedId> {
        self.graph.node_weight(index)
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_dangling_edges() {
        let a = AbstractedId::new("a");
        let b = AbstractedId::new("b");
        let topology = Topology::build(
            [a.clone(), b.clone(), a.clone()],
            [
                (a.clone(), b.clone(), "USES".to_string()),
                (a.clone(), AbstractedId::new("ghost"), "USES".to_string()),
            ],
        );
        assert_eq!(topology.node_count(), 2);
        assert_eq!(topology.edge_count(), 1);
        let idx = topology.node_index(&b).unwrap();
        assert_eq!(topology.id(idx), Some(&b));
    }
}
