//! Interpolation references inside configuration bodies
//!
//! Generated bodies point at other resources with `${type.name.attr}` or
//! the short `${name.attr}` form. This module only finds them; deciding what
//! a reference resolves to is up to the caller.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static INTERPOLATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_-]*)\.([A-Za-z0-9_][A-Za-z0-9_-]*)")
        .expect("interpolation pattern is valid")
});

/// Heads that never name a managed resource
pub const NON_RESOURCE_HEADS: &[&str] = &[
    "var", "local", "data", "module", "each", "count", "path", "self", "terraform",
];

/// First two dotted segments of one `${...}` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpolation<'a> {
    /// `type` in `${type.name}`, `name` in `${name.attr}`
    pub head: &'a str,
    /// The segment after the head
    pub second: &'a str,
}

impl Interpolation<'_> {
    /// Whether the head can name a resource at all
    #[inline]
    #[must_use]
    pub fn may_name_resource(&self) -> bool {
        !NON_RESOURCE_HEADS.contains(&self.head)
    }
}

/// Every interpolation in a string
pub fn interpolations(text: &str) -> impl Iterator<Item = Interpolation<'_>> {
    INTERPOLATION.captures_iter(text).filter_map(|caps| {
        Some(Interpolation {
            head: caps.get(1)?.as_str(),
            second: caps.get(2)?.as_str(),
        })
    })
}

/// Every string leaf of a JSON value, depth first
#[must_use]
pub fn string_leaves(value: &Value) -> Vec<&str> {
    let mut out = Vec::new();
    collect_strings(value, &mut out);
    out
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_long_and_short_forms() {
        let found: Vec<_> = interpolations(
            "${azurerm_virtual_network.vnet1.id}/x ${ vnet2.name } ${var.location}",
        )
        .collect();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].head, "azurerm_virtual_network");
        assert_eq!(found[0].second, "vnet1");
        assert_eq!(found[1].head, "vnet2");
        assert!(!found[2].may_name_resource());
    }

    #[test]
    fn ignores_plain_strings() {
        assert_eq!(interpolations("$vnet.id {a.b}").count(), 0);
    }

    #[test]
    fn string_leaves_walks_nested_values() {
        let value = json!({"a": ["x", {"b": "y"}], "c": 1, "d": "z"});
        let mut leaves = string_leaves(&value);
        leaves.sort_unstable();
        assert_eq!(leaves, vec!["x", "y", "z"]);
    }
}
