//! Validator suite
//!
//! Runs every registered validator over one configuration in registration
//! order and aggregates their reports. Per-child gaps are collected, never
//! short-circuited.

use crate::error::ValidationError;
use crate::report::{DependencyReport, Violation, ViolationKind};
use crate::rule::{builtin_rules, DependencyRule};
use crate::validator::{DependencyValidator, RuleValidator};
use serde::Serialize;
use twin_model::ConfigTree;

/// Ordered collection of validators
#[derive(Debug, Default)]
pub struct ValidatorSuite {
    validators: Vec<Box<dyn DependencyValidator>>,
}

impl ValidatorSuite {
    /// Empty suite
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Suite with every built-in rule
    #[must_use]
    pub fn with_defaults(auto_fix: bool) -> Self {
        Self::new().with_rules(builtin_rules(), auto_fix)
    }

    /// Add one rule validator per rule
    #[must_use]
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = DependencyRule>, auto_fix: bool) -> Self {
        for rule in rules {
            self.register(Box::new(RuleValidator::new(rule).with_auto_fix(auto_fix)));
        }
        self
    }

    /// Add a validator
    pub fn register(&mut self, validator: Box<dyn DependencyValidator>) {
        self.validators.push(validator);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run every validator, repairing where allowed
    pub fn run(&self, config: &mut ConfigTree) -> SuiteReport {
        let reports: Vec<DependencyReport> = self
            .validators
            .iter()
            .map(|validator| validator.validate(config))
            .collect();
        let suite = SuiteReport { reports };
        tracing::info!(
            validators = suite.reports.len(),
            examined = suite.examined(),
            fixed = suite.fixed(),
            violations = suite.violation_count(),
            "dependency validation complete"
        );
        suite
    }
}

/// Aggregated reports of one suite run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    pub reports: Vec<DependencyReport>,
}

impl SuiteReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.reports.iter().all(DependencyReport::is_valid)
    }

    #[must_use]
    pub fn examined(&self) -> usize {
        self.reports.iter().map(|r| r.examined).sum()
    }

    #[must_use]
    pub fn fixed(&self) -> usize {
        self.reports.iter().map(|r| r.fixed).sum()
    }

    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.reports.iter().map(DependencyReport::invalid_count).sum()
    }

    /// Report of one rule
    #[must_use]
    pub fn report(&self, rule: &str) -> Option<&DependencyReport> {
        self.reports.iter().find(|r| r.rule == rule)
    }

    /// Every violation across all validators
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.reports.iter().flat_map(|r| r.violations.iter())
    }

    /// Turn violations into an error carrying all of them
    ///
    /// # Errors
    /// [`ValidationError::UnresolvedParentDependency`] if any parent is
    /// missing, else [`ValidationError::MissingConstraint`] if any
    /// constraint was left unrepaired
    pub fn into_result(self) -> Result<Self, ValidationError> {
        if self.is_valid() {
            return Ok(self);
        }
        let violations: Vec<Violation> = self.violations().cloned().collect();
        if violations
            .iter()
            .any(|v| v.kind == ViolationKind::UnresolvedParent)
        {
            Err(ValidationError::UnresolvedParentDependency { violations })
        } else {
            Err(ValidationError::MissingConstraint { violations })
        }
    }
}
