//! Testing utilities for the twin workspace
//!
//! Shared fixtures: a small discovered network topology and the generated
//! configurations used by the splitter and validator scenarios.

#![allow(missing_docs)]

use serde_json::{json, Value};
use twin_model::{ConfigTree, DiscoveredRelationship, DiscoveredResource, ResourceBody};

pub const TENANT: &str = "tenant-contoso";
pub const OTHER_TENANT: &str = "tenant-fabrikam";
pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";
pub const RESOURCE_GROUP: &str = "rg-prod";

pub const VNET_TYPE: &str = "Microsoft.Network/virtualNetworks";
pub const SUBNET_TYPE: &str = "Microsoft.Network/virtualNetworks/subnets";
pub const NIC_TYPE: &str = "Microsoft.Network/networkInterfaces";
pub const VM_TYPE: &str = "Microsoft.Compute/virtualMachines";

pub fn arm_id(provider_type: &str, name: &str) -> String {
    format!(
        "/subscriptions/{SUBSCRIPTION}/resourceGroups/{RESOURCE_GROUP}/providers/{provider_type}/{name}"
    )
}

pub fn vnet_id(name: &str) -> String {
    arm_id(VNET_TYPE, name)
}

pub fn subnet_id(vnet: &str, name: &str) -> String {
    format!("{}/subnets/{name}", vnet_id(vnet))
}

pub fn nic_id(name: &str) -> String {
    arm_id(NIC_TYPE, name)
}

pub fn vm_id(name: &str) -> String {
    arm_id(VM_TYPE, name)
}

pub fn vnet(name: &str) -> DiscoveredResource {
    DiscoveredResource::new(
        vnet_id(name),
        TENANT,
        ResourceBody::new(VNET_TYPE, name)
            .with_location("westeurope")
            .with_properties(json!({"addressSpace": {"addressPrefixes": ["10.0.0.0/16"]}}))
            .with_tag("env", "prod"),
    )
}

pub fn subnet(vnet: &str, name: &str) -> DiscoveredResource {
    DiscoveredResource::new(
        subnet_id(vnet, name),
        TENANT,
        ResourceBody::new(SUBNET_TYPE, name)
            .with_properties(json!({"addressPrefix": "10.0.1.0/24"})),
    )
}

pub fn nic(name: &str, subnet: &str) -> DiscoveredResource {
    DiscoveredResource::new(
        nic_id(name),
        TENANT,
        ResourceBody::new(NIC_TYPE, name)
            .with_location("westeurope")
            .with_properties(json!({
                "ipConfigurations": [{
                    "id": format!("{}/ipConfigurations/ipconfig1", nic_id(name)),
                    "name": "ipconfig1",
                    "properties": {
                        "privateIPAddress": "10.0.1.4",
                        "subnet": {"id": subnet}
                    }
                }]
            })),
    )
}

pub fn vm(name: &str, nic: &str) -> DiscoveredResource {
    DiscoveredResource::new(
        vm_id(name),
        TENANT,
        ResourceBody::new(VM_TYPE, name)
            .with_location("westeurope")
            .with_properties(json!({
                "hardwareProfile": {"vmSize": "Standard_B2s"},
                "networkProfile": {"networkInterfaces": [{"id": nic}]}
            }))
            .with_tag("owner", "ops"),
    )
}

/// vnet1 ⊃ subnet1 ← nic1 ← vm1
pub fn sample_resources() -> Vec<DiscoveredResource> {
    vec![
        vnet("vnet1"),
        subnet("vnet1", "subnet1"),
        nic("nic1", &subnet_id("vnet1", "subnet1")),
        vm("vm1", &nic_id("nic1")),
    ]
}

pub fn sample_relationships() -> Vec<DiscoveredRelationship> {
    vec![
        DiscoveredRelationship::new(vnet_id("vnet1"), subnet_id("vnet1", "subnet1"), "CONTAINS"),
        DiscoveredRelationship::new(nic_id("nic1"), subnet_id("vnet1", "subnet1"), "CONNECTED_TO")
            .with_property("primary", json!(true)),
        DiscoveredRelationship::new(vm_id("vm1"), nic_id("nic1"), "USES"),
    ]
}

/// Shared blocks every generated configuration carries
pub fn shared_blocks() -> Value {
    json!({
        "terraform": {
            "required_providers": {
                "azurerm": {"source": "hashicorp/azurerm", "version": ">=3.0"}
            }
        },
        "provider": {"azurerm": {"features": {}}}
    })
}

fn with_resources(resources: Value) -> ConfigTree {
    let mut root = shared_blocks();
    if let Value::Object(map) = &mut root {
        map.insert("resource".to_string(), resources);
    }
    ConfigTree::new(root).unwrap()
}

/// Four resources, no interpolation between the vm/nic and vnet/subnet halves
pub fn scenario_config() -> ConfigTree {
    with_resources(json!({
        "azurerm_virtual_machine": {
            "vm1": {"name": "vm1", "network_interface_ids": ["${azurerm_network_interface.nic1.id}"]}
        },
        "azurerm_network_interface": {
            "nic1": {"name": "nic1", "location": "westeurope"}
        },
        "azurerm_virtual_network": {
            "vnet1": {"name": "vnet1", "address_space": ["10.0.0.0/16"]}
        },
        "azurerm_subnet": {
            "subnet1": {
                "name": "subnet1",
                "virtual_network_name": "${azurerm_virtual_network.vnet1.name}"
            }
        }
    }))
}

/// `vm1` interpolates `vnet1`, which belongs to a different community
pub fn cross_reference_config() -> ConfigTree {
    with_resources(json!({
        "azurerm_virtual_machine": {
            "vm1": {"name": "vm1", "tags": {"network": "${vnet1.id}"}}
        },
        "azurerm_network_interface": {
            "nic1": {"name": "nic1"}
        },
        "azurerm_virtual_network": {
            "vnet1": {"name": "vnet1"}
        },
        "azurerm_subnet": {
            "subnet1": {"name": "subnet1"}
        }
    }))
}

/// Private DNS zone link naming `zone`; the zone itself only when requested
pub fn dns_link_config(zone: &str, include_zone: bool) -> ConfigTree {
    let mut resources = json!({
        "azurerm_private_dns_zone_virtual_network_link": {
            "link1": {
                "name": "link1",
                "private_dns_zone_name": zone,
                "virtual_network_id": "${azurerm_virtual_network.vnet1.id}"
            }
        },
        "azurerm_virtual_network": {
            "vnet1": {"name": "vnet1"}
        }
    });
    if include_zone {
        resources["azurerm_private_dns_zone"] = json!({ zone: {"name": zone} });
    }
    with_resources(resources)
}

pub fn community(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| (*id).to_string()).collect()
}
