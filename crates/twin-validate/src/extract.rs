//! Parent extraction strategies
//!
//! Each strategy independently proposes candidate parent names for one child
//! declaration. The validator tries them in order and stops at the first
//! candidate that resolves to a declared parent.

use crate::rule::DependencyRule;
use serde_json::Value;
use std::fmt::Debug;
use twin_model::{interpolations, ResourceAddress};

/// Strategy proposing parent names for a child declaration
pub trait ParentExtractor: Send + Sync + Debug {
    /// Strategy name (for reports)
    fn name(&self) -> &'static str;

    /// Candidate parent names, most specific first
    fn candidates(
        &self,
        rule: &DependencyRule,
        child: &ResourceAddress,
        body: &Value,
    ) -> Vec<String>;
}

/// Strategies in their default order: id substring, name split, property
/// reference
#[must_use]
pub fn default_extractors() -> Vec<Box<dyn ParentExtractor>> {
    vec![
        Box::new(IdSubstringExtractor),
        Box::new(NameSplitExtractor),
        Box::new(PropertyReferenceExtractor),
    ]
}

fn reference_strings<'a>(rule: &DependencyRule, body: &'a Value) -> Vec<&'a str> {
    rule.reference_fields
        .iter()
        .flat_map(|path| path.strings(body))
        .collect()
}

fn push_unique(out: &mut Vec<String>, candidate: &str) {
    if !candidate.is_empty() && !out.iter().any(|c| c == candidate) {
        out.push(candidate.to_string());
    }
}

/// Parent name as the path segment after `rule.id_segment`
///
/// `/subscriptions/s/.../virtualNetworks/vnet1/subnets/a` with segment
/// `virtualNetworks` yields `vnet1`. On abstracted ids the segment is a hex
/// digest, which never matches a declaration and is not reported as a hint.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdSubstringExtractor;

impl ParentExtractor for IdSubstringExtractor {
    fn name(&self) -> &'static str {
        "id_substring"
    }

    fn candidates(
        &self,
        rule: &DependencyRule,
        _child: &ResourceAddress,
        body: &Value,
    ) -> Vec<String> {
        let Some(segment) = rule.id_segment.as_deref() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for value in reference_strings(rule, body) {
            let mut parts = value.split('/');
            while let Some(part) = parts.next() {
                if part.eq_ignore_ascii_case(segment) {
                    if let Some(name) = parts.next() {
                        push_unique(&mut out, name);
                    }
                }
            }
        }
        out
    }
}

/// Parent name as the child name's prefix before `rule.name_separator`
#[derive(Debug, Clone, Copy, Default)]
pub struct NameSplitExtractor;

impl ParentExtractor for NameSplitExtractor {
    fn name(&self) -> &'static str {
        "name_split"
    }

    fn candidates(
        &self,
        rule: &DependencyRule,
        child: &ResourceAddress,
        body: &Value,
    ) -> Vec<String> {
        let Some(separator) = rule.name_separator.as_deref().filter(|s| !s.is_empty()) else {
            return Vec::new();
        };
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(child.name.as_str());
        let mut out = Vec::new();
        if let Some((prefix, _)) = name.split_once(separator) {
            push_unique(&mut out, prefix);
        }
        out
    }
}

/// Parent named by a reference field: `${parent_type.name...}` or a bare name
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyReferenceExtractor;

impl ParentExtractor for PropertyReferenceExtractor {
    fn name(&self) -> &'static str {
        "property_reference"
    }

    fn candidates(
        &self,
        rule: &DependencyRule,
        _child: &ResourceAddress,
        body: &Value,
    ) -> Vec<String> {
        let mut out = Vec::new();
        for value in reference_strings(rule, body) {
            if value.contains("${") {
                for reference in interpolations(value) {
                    if reference.head == rule.parent_type {
                        push_unique(&mut out, reference.second);
                    }
                }
            } else if !value.contains('/') {
                push_unique(&mut out, value.trim());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn child() -> ResourceAddress {
        ResourceAddress::new("azurerm_subnet", "s1")
    }

    fn rule() -> DependencyRule {
        DependencyRule::new("r", "azurerm_subnet", "azurerm_virtual_network")
            .with_reference_field("virtual_network_name")
            .with_id_segment("virtualNetworks")
            .with_name_separator("--")
    }

    #[test]
    fn id_substring_reads_path_segment() {
        let body = json!({
            "virtual_network_name": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/VIRTUALNETWORKS/vnet9/subnets/x"
        });
        assert_eq!(IdSubstringExtractor.candidates(&rule(), &child(), &body), vec!["vnet9"]);
    }

    #[test]
    fn name_split_uses_prefix() {
        let body = json!({"name": "vnet1--frontend"});
        assert_eq!(NameSplitExtractor.candidates(&rule(), &child(), &body), vec!["vnet1"]);
        assert!(NameSplitExtractor
            .candidates(&rule(), &child(), &json!({"name": "plain"}))
            .is_empty());
    }

    #[test]
    fn property_reference_reads_interpolation_and_bare_names() {
        let interpolated = json!({"virtual_network_name": "${azurerm_virtual_network.vnet1.name}"});
        assert_eq!(
            PropertyReferenceExtractor.candidates(&rule(), &child(), &interpolated),
            vec!["vnet1"]
        );

        let bare = json!({"virtual_network_name": "vnet2"});
        assert_eq!(
            PropertyReferenceExtractor.candidates(&rule(), &child(), &bare),
            vec!["vnet2"]
        );

        let other_type = json!({"virtual_network_name": "${azurerm_subnet.x.name}"});
        assert!(PropertyReferenceExtractor
            .candidates(&rule(), &child(), &other_type)
            .is_empty());
    }

    #[test]
    fn default_order() {
        let names: Vec<_> = default_extractors().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["id_substring", "name_split", "property_reference"]);
    }
}
