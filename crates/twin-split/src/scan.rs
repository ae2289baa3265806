//! Cross-community reference scan
//!
//! Read-only and sharded across rayon workers. Callers collect every shard's
//! findings before deciding anything. Both `${...}` interpolations and
//! `depends_on` entries count as references.

use crate::index::CommunityIndex;
use rayon::prelude::*;
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use twin_model::{
    interpolations, string_leaves, ConfigTree, Interpolation, ResourceAddress, DEPENDS_ON_KEY,
};

/// One resource referencing a resource outside its own community
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CrossReference {
    pub from: ResourceAddress,
    pub from_community: usize,
    pub to: ResourceAddress,
    /// `None` when the target was dropped for matching no community
    pub to_community: Option<usize>,
    /// Source text of the reference, `${head.second}` or `depends_on <entry>`
    pub expression: String,
}

impl Display for CrossReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (community {}) references {} ",
            self.from, self.from_community, self.to
        )?;
        match self.to_community {
            Some(c) => write!(f, "(community {c})")?,
            None => f.write_str("(no community)")?,
        }
        write!(f, " via {}", self.expression)
    }
}

/// Every cross-community reference in the assigned entries, sorted
#[must_use]
pub fn scan_cross_references(config: &ConfigTree, index: &CommunityIndex) -> Vec<CrossReference> {
    let assigned: Vec<(&ResourceAddress, usize)> = index.assignments().collect();

    let mut found: Vec<CrossReference> = assigned
        .par_iter()
        .flat_map_iter(|&(from, community)| {
            let Some(body) = config.resource(from) else {
                return Vec::new();
            };
            let interpolated = string_leaves(body)
                .into_iter()
                .flat_map(interpolations)
                .filter(Interpolation::may_name_resource)
                .map(|reference| {
                    (
                        reference.head,
                        reference.second,
                        format!("${{{}.{}}}", reference.head, reference.second),
                    )
                });
            let ordered = body
                .get(DEPENDS_ON_KEY)
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .map(|entry| {
                    let (head, second) = entry.split_once('.').unwrap_or((entry, ""));
                    (head, second, format!("{DEPENDS_ON_KEY} {entry}"))
                });
            interpolated
                .chain(ordered)
                .filter_map(|(head, second, expression)| {
                    let to = resolve_target(config, index, community, head, second)?;
                    if &to == from {
                        return None;
                    }
                    let to_community = index.community_of(&to);
                    (to_community != Some(community)).then(|| CrossReference {
                        from: from.clone(),
                        from_community: community,
                        to,
                        to_community,
                        expression,
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect();

    found.sort();
    found.dedup();
    found
}

/// `type.name` first, then a bare name; references to nothing in the
/// configuration resolve to `None`
fn resolve_target(
    config: &ConfigTree,
    index: &CommunityIndex,
    community: usize,
    head: &str,
    second: &str,
) -> Option<ResourceAddress> {
    let qualified = ResourceAddress::new(head, second);
    if config.contains(&qualified) {
        return Some(qualified);
    }
    let named = index.named(head);
    named
        .iter()
        .find(|address| index.community_of(address) == Some(community))
        .or_else(|| named.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::CommunitySet;
    use serde_json::json;

    fn config() -> ConfigTree {
        ConfigTree::new(json!({"resource": {
            "azurerm_virtual_machine": {"vm1": {
                "nic": "${azurerm_network_interface.nic1.id}",
                "tags": {"net": "${vnet1.id}", "self": "${azurerm_virtual_machine.vm1.id}"},
                "size": "${var.size}"
            }},
            "azurerm_network_interface": {"nic1": {}},
            "azurerm_virtual_network": {"vnet1": {"note": "${ghost.id}"}},
            "azurerm_public_ip": {"pip1": {}},
            "azurerm_lb": {"lb1": {"ip": "${azurerm_public_ip.pip1.id}"}}
        }}))
        .unwrap()
    }

    #[test]
    fn flags_other_community_and_dropped_targets() {
        let communities =
            CommunitySet::new([vec!["vm1", "nic1"], vec!["vnet1", "lb1"]]).unwrap();
        let config = config();
        let index = CommunityIndex::build(&config, &communities);
        let found = scan_cross_references(&config, &index);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].from, ResourceAddress::new("azurerm_lb", "lb1"));
        assert_eq!(found[0].to_community, None);
        assert_eq!(found[1].from, ResourceAddress::new("azurerm_virtual_machine", "vm1"));
        assert_eq!(found[1].to, ResourceAddress::new("azurerm_virtual_network", "vnet1"));
        assert_eq!(found[1].to_community, Some(1));
        assert!(found[1].to_string().contains("${vnet1.id}"));
    }

    #[test]
    fn same_community_is_clean() {
        let communities =
            CommunitySet::new([vec!["vm1", "nic1", "vnet1", "lb1", "pip1"]]).unwrap();
        let config = config();
        let index = CommunityIndex::build(&config, &communities);
        assert!(scan_cross_references(&config, &index).is_empty());
    }

    #[test]
    fn ordering_constraints_count_as_references() {
        let config = ConfigTree::new(json!({"resource": {
            "azurerm_private_dns_zone_virtual_network_link": {"link1": {
                "depends_on": ["azurerm_private_dns_zone.z", "vnet1", "azurerm_gone.x"]
            }},
            "azurerm_virtual_network": {"vnet1": {}},
            "azurerm_private_dns_zone": {"z": {}}
        }}))
        .unwrap();
        let communities = CommunitySet::new([vec!["link1", "vnet1"], vec!["z"]]).unwrap();
        let index = CommunityIndex::build(&config, &communities);
        let found = scan_cross_references(&config, &index);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].to, ResourceAddress::new("azurerm_private_dns_zone", "z"));
        assert_eq!(found[0].to_community, Some(1));
        assert!(found[0]
            .to_string()
            .ends_with("via depends_on azurerm_private_dns_zone.z"));

        let together = CommunitySet::new([vec!["link1", "vnet1", "z"]]).unwrap();
        let index = CommunityIndex::build(&config, &together);
        assert!(scan_cross_references(&config, &index).is_empty());
    }

    #[test]
    fn bare_name_constraint_to_dropped_resource() {
        let config = ConfigTree::new(json!({"resource": {
            "azurerm_subnet": {"sub1": {"depends_on": ["vnet1"]}},
            "azurerm_virtual_network": {"vnet1": {}}
        }}))
        .unwrap();
        let communities = CommunitySet::new([vec!["sub1"]]).unwrap();
        let index = CommunityIndex::build(&config, &communities);
        let found = scan_cross_references(&config, &index);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].to, ResourceAddress::new("azurerm_virtual_network", "vnet1"));
        assert_eq!(found[0].to_community, None);
    }
}
