//! Error types for the replica pipeline

use std::path::PathBuf;
use twin_graph::GraphError;
use twin_identity::{AbstractionError, SeedError};
use twin_model::ModelError;
use twin_split::SplitError;
use twin_validate::ValidationError;

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum ReplicaError {
    /// Configuration values out of range or inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file extension not recognised
    #[error("unsupported configuration format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Abstraction(#[from] AbstractionError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Split(#[from] SplitError),

    /// Emitter could not render the abstracted graph
    #[error("emitter '{emitter}' failed: {reason}")]
    Emit { emitter: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReplicaError {
    /// Invariant and partition violations; the run must stop
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Graph(err) => err.is_fatal(),
            Self::Split(err) => err.is_fatal(),
            Self::Validation(_) | Self::Abstraction(_) => false,
            _ => true,
        }
    }

    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }
}
