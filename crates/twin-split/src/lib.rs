//! Twin Split
//!
//! Community-based partitioning of a generated configuration into
//! independently deployable files.
//!
//! # Core Concepts
//!
//! - [`CommunityDetector`]: any `topology -> disjoint id sets` function;
//!   [`ConnectedComponentsDetector`] is the default
//! - [`CommunitySet`]: validated, disjoint partition
//! - [`CommunityIndex`]: entry-to-community lookup tolerant of label mismatch
//! - [`split`]: bucket, scan for cross-community references, render
//! - [`SplitOutput::write_to_dir`]: all-or-nothing write with a manifest
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use twin_model::ConfigTree;
//! use twin_split::{split, CommunitySet};
//!
//! let config = ConfigTree::new(json!({"resource": {
//!     "azurerm_virtual_network": {"vnet1": {}},
//!     "azurerm_subnet": {"subnet1": {"virtual_network_name": "${azurerm_virtual_network.vnet1.name}"}}
//! }})).unwrap();
//!
//! let communities = CommunitySet::new([vec!["vnet1", "subnet1"]]).unwrap();
//! let output = split(&config, &communities).unwrap();
//! assert_eq!(output.manifest.total_resources, 2);
//! assert_eq!(output.file_count(), 2);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod community;
mod detect;
mod error;
mod index;
mod manifest;
mod scan;
mod splitter;
mod writer;

pub use community::CommunitySet;
pub use detect::{CommunityDetector, ConnectedComponentsDetector, FnDetector};
pub use error::SplitError;
pub use index::CommunityIndex;
pub use manifest::{CommunityManifest, ManifestEntry, MANIFEST_FILE};
pub use scan::{scan_cross_references, CrossReference};
pub use splitter::{split, SplitFile, SplitOutput};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
