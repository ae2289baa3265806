//! Twin Identity
//!
//! Tenant seeds and deterministic identifier abstraction.
//!
//! # Core Concepts
//!
//! - [`TenantSeed`]: 256 bits of randomness per tenant, created once and never
//!   rotated
//! - [`SeedStore`]: insert-if-absent persistence ([`MemorySeedStore`],
//!   [`FileSeedStore`])
//! - [`SeedRegistry`]: process-wide `get_or_create_seed` in front of a store
//! - [`IdAbstractor`]: `abstract_id(seed, original)`, a keyed Blake3 mapping
//!   that keeps resource-path shape
//! - [`IdentifierSchema`]: per-type allowlist of nested identifier fields
//!
//! # Example
//!
//! ```rust
//! use twin_identity::{IdAbstractor, SeedRegistry};
//! use twin_model::TenantId;
//!
//! let registry = SeedRegistry::in_memory();
//! let seed = registry.get_or_create_seed(&TenantId::new("contoso")).unwrap();
//!
//! let abstractor = IdAbstractor::new();
//! let a = abstractor.abstract_id(&seed, "vm-42").unwrap();
//! let b = abstractor.abstract_id(&seed, "vm-42").unwrap();
//! assert_eq!(a, b);
//! assert!(a.as_str().starts_with("anon-"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod abstraction;
mod error;
mod registry;
mod schema;
mod seed;
mod store;

pub use abstraction::{IdAbstractor, MAX_DIGEST_BYTES, MIN_DIGEST_BYTES, OPAQUE_PREFIX};
pub use error::{AbstractionError, SeedError};
pub use registry::SeedRegistry;
pub use schema::{IdentifierSchema, WILDCARD_TYPE};
pub use seed::{SeedRecord, TenantSeed, SEED_LEN};
pub use store::{FileSeedStore, InsertOutcome, MemorySeedStore, SeedStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
