//! Twin Core
//!
//! Wires the workspace together: discovered resources go into the dual
//! graph, the abstracted side is emitted as configuration, dependency
//! validators repair ordering, and the result is split into independently
//! deployable community files.
//!
//! # Core Concepts
//!
//! - [`ReplicaConfig`]: TOML/YAML configuration with builder overrides
//! - [`ConfigEmitter`]: abstracted graph → configuration ([`BasicEmitter`])
//! - [`ReplicaPipeline`]: one call from discovery records to files on disk
//! - [`init_tracing`]: `RUST_LOG`-driven subscriber, pretty or JSON
//!
//! # Example
//!
//! ```rust,no_run
//! use twin_core::{init_tracing, BasicEmitter, ReplicaConfig, ReplicaPipeline};
//!
//! # fn main() -> Result<(), twin_core::ReplicaError> {
//! let config = ReplicaConfig::from_file("replica.toml".as_ref())?;
//! init_tracing(config.log_format);
//!
//! let pipeline = ReplicaPipeline::from_config(&config, Box::new(BasicEmitter::new()))?;
//! let report = pipeline.run(&[], &[])?;
//! println!("{} files written", report.files.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod emit;
pub mod error;
pub mod pipeline;
pub mod telemetry;

pub use config::{LogFormat, ReplicaConfig};
pub use emit::{BasicEmitter, ConfigEmitter, EmittedConfig};
pub use error::ReplicaError;
pub use pipeline::{PipelineReport, ReplicaPipeline};
pub use telemetry::init_tracing;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
