//! Twin Validate
//!
//! Dependency-ordering validation and repair for generated configuration.
//!
//! A child declaration (a subnet, a DNS zone link) can only deploy after its
//! parent. Validators find the parent through an ordered list of extraction
//! strategies and make sure the child's `depends_on` names it.
//!
//! # Core Concepts
//!
//! - [`DependencyRule`]: child type, parent type, and where to look for hints
//! - [`ParentExtractor`]: [`IdSubstringExtractor`], [`NameSplitExtractor`],
//!   [`PropertyReferenceExtractor`], tried in that order with early exit
//! - [`RuleValidator`] / [`DependencyValidator`]: check and repair one rule
//! - [`ValidatorSuite`]: every rule over one configuration
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use twin_model::ConfigTree;
//! use twin_validate::ValidatorSuite;
//!
//! let mut config = ConfigTree::new(json!({"resource": {
//!     "azurerm_virtual_network": {"vnet1": {"name": "vnet1"}},
//!     "azurerm_subnet": {"s1": {"name": "s1", "virtual_network_name": "vnet1"}}
//! }})).unwrap();
//!
//! let report = ValidatorSuite::with_defaults(true).run(&mut config);
//! assert!(report.is_valid());
//! assert_eq!(report.fixed(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod extract;
mod report;
mod rule;
mod suite;
mod validator;

pub use error::ValidationError;
pub use extract::{
    default_extractors, IdSubstringExtractor, NameSplitExtractor, ParentExtractor,
    PropertyReferenceExtractor,
};
pub use report::{DependencyReport, Violation, ViolationKind};
pub use rule::{builtin_rules, DependencyRule};
pub use suite::{SuiteReport, ValidatorSuite};
pub use validator::{DependencyValidator, RuleValidator};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
