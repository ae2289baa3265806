//! Validation error types

use crate::report::Violation;

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Aggregated dependency validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// At least one child has no declared parent
    #[error("{} unresolved parent dependencies: {}", .violations.len(), summarize(.violations))]
    UnresolvedParentDependency {
        /// Every gap found, resolved or not
        violations: Vec<Violation>,
    },

    /// Parents exist but constraints were left missing
    #[error("{} missing ordering constraints: {}", .violations.len(), summarize(.violations))]
    MissingConstraint {
        /// Every gap found
        violations: Vec<Violation>,
    },
}

impl ValidationError {
    /// All violations carried by the error
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::UnresolvedParentDependency { violations }
            | Self::MissingConstraint { violations } => violations,
        }
    }
}
