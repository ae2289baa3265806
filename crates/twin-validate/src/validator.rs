//! Rule-driven dependency validator
//!
//! For every child declaration of a rule, finds the parent through the
//! extraction strategies and makes sure the child's `depends_on` names it.
//! A found parent with a missing constraint is repaired in place (when
//! enabled); a parent that cannot be found is reported, never invented.

use crate::extract::{default_extractors, ParentExtractor};
use crate::report::{DependencyReport, Violation};
use crate::rule::DependencyRule;
use serde_json::Value;
use std::fmt::Debug;
use twin_model::{ConfigTree, ResourceAddress, DEPENDS_ON_KEY};

/// Checks and repairs ordering constraints in a configuration
pub trait DependencyValidator: Send + Sync + Debug {
    /// Validator name (for reports)
    fn name(&self) -> &str;

    /// Validate every relevant declaration, repairing where allowed
    fn validate(&self, config: &mut ConfigTree) -> DependencyReport;
}

/// [`DependencyValidator`] for one [`DependencyRule`]
#[derive(Debug)]
pub struct RuleValidator {
    rule: DependencyRule,
    extractors: Vec<Box<dyn ParentExtractor>>,
    auto_fix: bool,
}

impl RuleValidator {
    /// Validator with the default strategies and repair enabled
    #[must_use]
    pub fn new(rule: DependencyRule) -> Self {
        Self {
            rule,
            extractors: default_extractors(),
            auto_fix: true,
        }
    }

    /// Enable or disable in-place repair
    #[inline]
    #[must_use]
    pub fn with_auto_fix(mut self, auto_fix: bool) -> Self {
        self.auto_fix = auto_fix;
        self
    }

    /// Replace the extraction strategies (tried in the given order)
    #[must_use]
    pub fn with_extractors(mut self, extractors: Vec<Box<dyn ParentExtractor>>) -> Self {
        self.extractors = extractors;
        self
    }

    #[inline]
    #[must_use]
    pub fn rule(&self) -> &DependencyRule {
        &self.rule
    }

    /// First candidate that resolves to a declared parent, or the first
    /// readable hint seen if none does
    fn resolve_parent(
        &self,
        config: &ConfigTree,
        child: &ResourceAddress,
        body: &Value,
    ) -> Result<ResourceAddress, Option<String>> {
        let mut first_hint: Option<String> = None;
        for extractor in &self.extractors {
            for candidate in extractor.candidates(&self.rule, child, body) {
                if let Some(parent) = find_parent(config, &self.rule.parent_type, &candidate) {
                    tracing::debug!(
                        rule = %self.rule.name,
                        strategy = extractor.name(),
                        %child,
                        %parent,
                        "resolved parent"
                    );
                    return Ok(parent);
                }
                if !is_abstracted_segment(&candidate) {
                    first_hint.get_or_insert(candidate);
                }
            }
        }
        Err(first_hint)
    }
}

/// Digest segments of abstracted ids name no declaration, so they make
/// useless hints
fn is_abstracted_segment(candidate: &str) -> bool {
    candidate.starts_with("anon-")
        || (candidate.len() >= 32 && candidate.bytes().all(|b| b.is_ascii_hexdigit()))
}

impl DependencyValidator for RuleValidator {
    fn name(&self) -> &str {
        &self.rule.name
    }

    fn validate(&self, config: &mut ConfigTree) -> DependencyReport {
        let mut report = DependencyReport::new(&self.rule.name);
        let mut repairs: Vec<(ResourceAddress, ResourceAddress)> = Vec::new();

        for (child, body) in config.resources_of_type(&self.rule.child_type) {
            report.examined += 1;
            match self.resolve_parent(config, &child, body) {
                Ok(parent) => {
                    if has_constraint(body, &parent.to_string()) {
                        report.already_valid += 1;
                    } else if self.auto_fix {
                        repairs.push((child, parent));
                    } else {
                        report
                            .violations
                            .push(Violation::missing_constraint(&self.rule.name, &child, &parent));
                    }
                }
                Err(hint) => {
                    report.missing += 1;
                    let violation = Violation::unresolved(
                        &self.rule.name,
                        &child,
                        &self.rule.parent_type,
                        hint.as_deref(),
                    );
                    tracing::warn!(%violation, "unresolved parent");
                    report.violations.push(violation);
                }
            }
        }

        for (child, parent) in repairs {
            if add_constraint(config, &child, &parent.to_string()) {
                tracing::debug!(%child, %parent, "added ordering constraint");
                report.fixed += 1;
            } else {
                report
                    .violations
                    .push(Violation::missing_constraint(&self.rule.name, &child, &parent));
            }
        }

        report
    }
}

/// Parent by declaration label first, then by body `name`
fn find_parent(config: &ConfigTree, parent_type: &str, candidate: &str) -> Option<ResourceAddress> {
    let by_label = ResourceAddress::new(parent_type, candidate);
    if config.contains(&by_label) {
        return Some(by_label);
    }
    config
        .resources_of_type(parent_type)
        .into_iter()
        .find(|(_, body)| body.get("name").and_then(Value::as_str) == Some(candidate))
        .map(|(address, _)| address)
}

fn has_constraint(body: &Value, constraint: &str) -> bool {
    body.get(DEPENDS_ON_KEY)
        .and_then(Value::as_array)
        .is_some_and(|deps| deps.iter().any(|d| d.as_str() == Some(constraint)))
}

/// Append to `depends_on`, creating it if absent; false if it is not a list
fn add_constraint(config: &mut ConfigTree, child: &ResourceAddress, constraint: &str) -> bool {
    let Some(Value::Object(body)) = config.resource_mut(child) else {
        return false;
    };
    let deps = body
        .entry(DEPENDS_ON_KEY.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    let Value::Array(deps) = deps else {
        return false;
    };
    if !deps.iter().any(|d| d.as_str() == Some(constraint)) {
        deps.push(Value::String(constraint.to_string()));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ViolationKind;
    use serde_json::json;

    fn subnet_rule() -> DependencyRule {
        DependencyRule::new("subnet_network", "azurerm_subnet", "azurerm_virtual_network")
            .with_reference_field("virtual_network_name")
            .with_id_segment("virtualNetworks")
    }

    fn config(subnet_body: Value) -> ConfigTree {
        ConfigTree::new(json!({
            "resource": {
                "azurerm_virtual_network": {"vnet_main": {"name": "vnet1"}},
                "azurerm_subnet": {"s1": subnet_body}
            }
        }))
        .unwrap()
    }

    fn depends_on(tree: &ConfigTree) -> Value {
        tree.resource(&ResourceAddress::new("azurerm_subnet", "s1")).unwrap()[DEPENDS_ON_KEY].clone()
    }

    #[test]
    fn repairs_missing_constraint_idempotently() {
        let mut tree = config(json!({"name": "s1", "virtual_network_name": "vnet1"}));
        let validator = RuleValidator::new(subnet_rule());

        let first = validator.validate(&mut tree);
        assert_eq!((first.examined, first.fixed, first.already_valid), (1, 1, 0));
        assert!(first.is_valid());
        assert_eq!(depends_on(&tree), json!(["azurerm_virtual_network.vnet_main"]));

        let second = validator.validate(&mut tree);
        assert_eq!((second.examined, second.fixed, second.already_valid), (1, 0, 1));
        assert_eq!(depends_on(&tree), json!(["azurerm_virtual_network.vnet_main"]));
    }

    #[test]
    fn reports_without_fabricating() {
        let mut tree = config(json!({"name": "s1", "virtual_network_name": "vnet-gone"}));
        let report = RuleValidator::new(subnet_rule()).validate(&mut tree);

        assert_eq!(report.missing, 1);
        assert!(!report.is_valid());
        assert_eq!(report.violations[0].kind, ViolationKind::UnresolvedParent);
        assert_eq!(report.violations[0].parent_name.as_deref(), Some("vnet-gone"));
        assert_eq!(depends_on(&tree), Value::Null);
        assert_eq!(tree.resource_count(), 2);
    }

    #[test]
    fn digest_segments_are_not_hints() {
        let digest = "9f86d081884c7d659a2feaa0c55ad015";
        let mut tree = config(json!({
            "name": "s1",
            "virtual_network_name": format!("/subscriptions/{digest}/virtualNetworks/{digest}")
        }));
        let report = RuleValidator::new(subnet_rule()).validate(&mut tree);

        assert_eq!(report.missing, 1);
        assert_eq!(report.violations[0].parent_name, None);
        assert!(is_abstracted_segment(digest));
        assert!(is_abstracted_segment("anon-1234"));
        assert!(!is_abstracted_segment("vnet1"));
        assert!(!is_abstracted_segment("deadbeef"));
    }

    #[test]
    fn reports_child_with_no_hint() {
        let mut tree = config(json!({"name": "s1"}));
        let report = RuleValidator::new(subnet_rule()).validate(&mut tree);
        assert_eq!(report.missing, 1);
        assert_eq!(report.violations[0].parent_name, None);
    }

    #[test]
    fn repair_disabled_reports_missing_constraint() {
        let mut tree = config(json!({"name": "s1", "virtual_network_name": "vnet1"}));
        let report = RuleValidator::new(subnet_rule())
            .with_auto_fix(false)
            .validate(&mut tree);
        assert_eq!(report.violations[0].kind, ViolationKind::MissingConstraint);
        assert_eq!(report.missing, 0);
        assert_eq!(depends_on(&tree), Value::Null);
    }

    #[test]
    fn non_list_depends_on_is_left_alone() {
        let mut tree = config(json!({
            "name": "s1",
            "virtual_network_name": "vnet1",
            "depends_on": "oops"
        }));
        let report = RuleValidator::new(subnet_rule()).validate(&mut tree);
        assert_eq!(report.fixed, 0);
        assert_eq!(report.invalid_count(), 1);
        assert_eq!(depends_on(&tree), json!("oops"));
    }
}
