//! Validation results

use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use twin_model::ResourceAddress;

/// Kind of dependency gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// No declared parent matches any hint
    UnresolvedParent,
    /// Parent found, constraint absent and repair disabled
    MissingConstraint,
}

/// One child declaration with a dependency gap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule: String,
    pub kind: ViolationKind,
    /// `type.name` of the child
    pub child: String,
    pub parent_type: String,
    /// Parent name the hints pointed at, if any
    pub parent_name: Option<String>,
    pub message: String,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

impl Violation {
    pub(crate) fn unresolved(
        rule: &str,
        child: &ResourceAddress,
        parent_type: &str,
        parent_name: Option<&str>,
    ) -> Self {
        let message = match parent_name {
            Some(name) => format!(
                "{child} references {parent_type} '{name}' which is not declared"
            ),
            None => format!("{child} has no reference to any {parent_type}"),
        };
        Self {
            rule: rule.to_string(),
            kind: ViolationKind::UnresolvedParent,
            child: child.to_string(),
            parent_type: parent_type.to_string(),
            parent_name: parent_name.map(str::to_string),
            message,
        }
    }

    pub(crate) fn missing_constraint(
        rule: &str,
        child: &ResourceAddress,
        parent: &ResourceAddress,
    ) -> Self {
        Self {
            rule: rule.to_string(),
            kind: ViolationKind::MissingConstraint,
            child: child.to_string(),
            parent_type: parent.resource_type.clone(),
            parent_name: Some(parent.name.clone()),
            message: format!("{child} does not depend on {parent}"),
        }
    }
}

/// Outcome of one rule over one configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub rule: String,
    /// Child declarations looked at
    pub examined: usize,
    /// Children already carrying the constraint
    pub already_valid: usize,
    /// Children that had the constraint added
    pub fixed: usize,
    /// Children whose parent could not be found
    pub missing: usize,
    pub violations: Vec<Violation>,
}

impl DependencyReport {
    pub(crate) fn new(rule: &str) -> Self {
        Self {
            rule: rule.to_string(),
            ..Self::default()
        }
    }

    /// Whether every examined child now has its constraint
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of children left invalid
    #[inline]
    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.violations.len()
    }
}
