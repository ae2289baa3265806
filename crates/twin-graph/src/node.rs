//! Node and edge types of both representations
//!
//! The two node collections never share a type: an [`OriginalNode`] is keyed
//! by an [`OriginalId`], an [`AbstractedNode`] by an [`AbstractedId`], and the
//! only relation crossing between them is the [`TraceEdge`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};
use twin_model::{AbstractedId, OriginalId, ResourceBody, TenantId};

/// Which side of the dual graph a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    /// Real, source-issued identifiers
    Original,
    /// Synthetic identifiers; the default query side
    Abstracted,
}

impl Display for Representation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => f.write_str("original"),
            Self::Abstracted => f.write_str("abstracted"),
        }
    }
}

/// Resource as discovered, immutable once committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalNode {
    pub id: OriginalId,
    pub tenant_id: TenantId,
    pub body: ResourceBody,
}

/// Resource with every identifier-shaped field abstracted
///
/// Carries no tenant id; the owning tenant is only reachable through the
/// trace edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractedNode {
    pub id: AbstractedId,
    pub body: ResourceBody,
}

/// Abstracted → original traceability link, exactly one per pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TraceEdge {
    pub from: AbstractedId,
    pub to: OriginalId,
}

/// Typed relationship between two nodes of the same representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEdge<I> {
    pub from: I,
    pub to: I,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl<I: Clone> RelationshipEdge<I> {
    pub(crate) fn key(&self) -> EdgeKey<I> {
        (self.from.clone(), self.to.clone(), self.rel_type.clone())
    }
}

/// Relationship identity: one edge per `(from, to, type)`
pub(crate) type EdgeKey<I> = (I, I, String);

/// Relationship on the original side
pub type OriginalEdge = RelationshipEdge<OriginalId>;

/// Relationship on the abstracted side
pub type AbstractedEdge = RelationshipEdge<AbstractedId>;
