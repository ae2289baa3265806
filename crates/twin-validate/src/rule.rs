//! Dependency rules
//!
//! A rule says "every `child_type` declaration needs its `parent_type`
//! declaration to exist first" and tells the extraction strategies where to
//! look for the parent's name.

use serde::{Deserialize, Serialize};
use twin_model::FieldPath;

/// One child → parent ordering requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRule {
    /// Rule name used in reports
    pub name: String,
    /// Declaration type that depends on the parent
    pub child_type: String,
    /// Declaration type that must exist first
    pub parent_type: String,
    /// Body fields that may name the parent (dot paths, `[]` for lists)
    #[serde(default)]
    pub reference_fields: Vec<FieldPath>,
    /// Resource-path key preceding the parent's name, e.g. `virtualNetworks`
    #[serde(default)]
    pub id_segment: Option<String>,
    /// Separator after which the child name's parent prefix ends
    #[serde(default)]
    pub name_separator: Option<String>,
}

impl DependencyRule {
    /// Rule with no hints yet
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        child_type: impl Into<String>,
        parent_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            child_type: child_type.into(),
            parent_type: parent_type.into(),
            reference_fields: Vec::new(),
            id_segment: None,
            name_separator: None,
        }
    }

    /// With a field that may name the parent
    ///
    /// Unparsable paths are ignored.
    #[must_use]
    pub fn with_reference_field(mut self, path: &str) -> Self {
        if let Ok(path) = path.parse() {
            self.reference_fields.push(path);
        }
        self
    }

    #[must_use]
    pub fn with_id_segment(mut self, segment: impl Into<String>) -> Self {
        self.id_segment = Some(segment.into());
        self
    }

    #[must_use]
    pub fn with_name_separator(mut self, separator: impl Into<String>) -> Self {
        self.name_separator = Some(separator.into());
        self
    }
}

/// Built-in rules for common network and compute declarations
#[must_use]
pub fn builtin_rules() -> Vec<DependencyRule> {
    let mut rules = vec![
        DependencyRule::new(
            "private_dns_zone_link",
            "azurerm_private_dns_zone_virtual_network_link",
            "azurerm_private_dns_zone",
        )
        .with_reference_field("private_dns_zone_name")
        .with_id_segment("privateDnsZones"),
        DependencyRule::new(
            "private_dns_zone_link_network",
            "azurerm_private_dns_zone_virtual_network_link",
            "azurerm_virtual_network",
        )
        .with_reference_field("virtual_network_id")
        .with_id_segment("virtualNetworks"),
        DependencyRule::new("subnet_network", "azurerm_subnet", "azurerm_virtual_network")
            .with_reference_field("virtual_network_name")
            .with_id_segment("virtualNetworks"),
        DependencyRule::new("nic_subnet", "azurerm_network_interface", "azurerm_subnet")
            .with_reference_field("ip_configuration.subnet_id")
            .with_reference_field("ip_configuration[].subnet_id")
            .with_id_segment("subnets"),
        DependencyRule::new(
            "nsg_association_subnet",
            "azurerm_subnet_network_security_group_association",
            "azurerm_subnet",
        )
        .with_reference_field("subnet_id")
        .with_id_segment("subnets"),
        DependencyRule::new(
            "nsg_association_group",
            "azurerm_subnet_network_security_group_association",
            "azurerm_network_security_group",
        )
        .with_reference_field("network_security_group_id")
        .with_id_segment("networkSecurityGroups"),
    ];

    for vm_type in [
        "azurerm_virtual_machine",
        "azurerm_linux_virtual_machine",
        "azurerm_windows_virtual_machine",
    ] {
        rules.push(
            DependencyRule::new(format!("{vm_type}_nic"), vm_type, "azurerm_network_interface")
                .with_reference_field("network_interface_ids")
                .with_id_segment("networkInterfaces"),
        );
    }

    rules
}
