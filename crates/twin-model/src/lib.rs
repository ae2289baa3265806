//! Twin Model
//!
//! Shared vocabulary for the dual-representation resource graph.
//!
//! # Core Concepts
//!
//! - [`OriginalId`] / [`AbstractedId`] / [`TenantId`]: identifier newtypes that
//!   never mix representations
//! - [`DiscoveredResource`] / [`DiscoveredRelationship`]: ingestion inputs
//! - [`FieldPath`]: addressing identifier-shaped fields inside property bags
//! - [`ConfigTree`]: a generated declarative configuration
//! - [`interpolations`]: `${type.name}` references inside configuration bodies
//! - [`Digest`]: 32-byte Blake3 digest, plain or keyed
//!
//! # Example
//!
//! ```rust
//! use twin_model::{ConfigTree, ResourceAddress};
//! use serde_json::json;
//!
//! let tree = ConfigTree::new(json!({
//!     "resource": {"azurerm_virtual_network": {"vnet1": {"name": "vnet1"}}}
//! })).unwrap();
//!
//! let addr = ResourceAddress::new("azurerm_virtual_network", "vnet1");
//! assert!(tree.contains(&addr));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod digest;
mod error;
mod field_path;
mod ids;
mod reference;
mod resource;

pub use config::{ConfigTree, ResourceAddress, DEPENDS_ON_KEY, RESOURCE_KEY};
pub use digest::{Digest, DigestError};
pub use error::ModelError;
pub use field_path::{FieldPath, FieldPathError, Segment};
pub use ids::{AbstractedId, OriginalId, TenantId};
pub use reference::{interpolations, string_leaves, Interpolation, NON_RESOURCE_HEADS};
pub use resource::{DiscoveredRelationship, DiscoveredResource, ResourceBody};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
