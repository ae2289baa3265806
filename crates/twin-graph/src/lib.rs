//! Twin Graph
//!
//! Dual-representation resource graph: every discovered resource exists as
//! an original node (real identifiers) and an abstracted node (synthetic
//! identifiers), linked by exactly one trace edge.
//!
//! # Core Concepts
//!
//! - [`DualGraphStore`]: both node collections, the trace relation, and each
//!   side's relationship edges behind one lock
//! - Query paths: [`DualGraphStore::nodes`] / [`DualGraphStore::abstracted`]
//!   (default), [`DualGraphStore::original`], [`DualGraphStore::trace`]
//! - [`DualNodeProcessor`]: atomic, idempotent pair creation
//! - [`RelationshipDuplicator`]: mirrors edges onto both sides
//! - [`Ingestor`]: parallel two-phase ingestion
//! - [`IntegrityReport`] and [`GraphSnapshot`]
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use twin_graph::{DualGraphStore, DualNodeProcessor};
//! use twin_identity::SeedRegistry;
//! use twin_model::{DiscoveredResource, ResourceBody};
//!
//! let store = Arc::new(DualGraphStore::new());
//! let processor = DualNodeProcessor::new(Arc::clone(&store), Arc::new(SeedRegistry::in_memory()));
//!
//! let vm = DiscoveredResource::new("vm-42", "tenant-a", ResourceBody::new("vm", "web"));
//! processor.process(&vm).unwrap();
//! processor.process(&vm).unwrap();
//!
//! assert_eq!(store.nodes().node_count(), 1);
//! assert!(store.verify().is_ok());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod duplicator;
mod error;
mod ingest;
mod integrity;
mod node;
mod processor;
mod snapshot;
mod store;
mod topology;
mod view;

pub use duplicator::RelationshipDuplicator;
pub use error::GraphError;
pub use ingest::{IngestFailure, IngestPhase, IngestReport, Ingestor};
pub use integrity::{EdgeCounts, IntegrityReport};
pub use node::{
    AbstractedEdge, AbstractedNode, OriginalEdge, OriginalNode, RelationshipEdge,
    Representation, TraceEdge,
};
pub use processor::{DualNodeProcessor, ProcessOutcome};
pub use snapshot::{GraphSnapshot, SNAPSHOT_VERSION};
pub use store::{CommitOutcome, DualGraphStore, LinkOutcome};
pub use topology::Topology;
pub use view::{AbstractedView, OriginalView, TraceView};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
