//! Identifier-shaped field allowlist
//!
//! Which nested properties carry identifiers depends on the resource type,
//! so the abstracted side only rewrites fields an explicit per-type
//! allowlist names. The `*` entry applies to every type.

use crate::abstraction::IdAbstractor;
use crate::error::AbstractionError;
use crate::seed::TenantSeed;
use serde_json::Value;
use std::collections::BTreeMap;
use twin_model::FieldPath;

/// Type key matching every resource type
pub const WILDCARD_TYPE: &str = "*";

/// Per-type allowlist of identifier field paths
///
/// Type keys are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSchema {
    fields: BTreeMap<String, Vec<FieldPath>>,
}

const AZURE_DEFAULTS: &[(&str, &[&str])] = &[
    (WILDCARD_TYPE, &["id"]),
    (
        "Microsoft.Network/networkInterfaces",
        &[
            "ipConfigurations[].id",
            "ipConfigurations[].properties.subnet.id",
            "ipConfigurations[].properties.publicIPAddress.id",
            "networkSecurityGroup.id",
            "virtualMachine.id",
        ],
    ),
    (
        "Microsoft.Network/virtualNetworks",
        &[
            "subnets[].id",
            "subnets[].properties.networkSecurityGroup.id",
            "subnets[].properties.routeTable.id",
            "virtualNetworkPeerings[].properties.remoteVirtualNetwork.id",
        ],
    ),
    (
        "Microsoft.Network/virtualNetworks/subnets",
        &["networkSecurityGroup.id", "routeTable.id", "ipConfigurations[].id"],
    ),
    (
        "Microsoft.Network/networkSecurityGroups",
        &["subnets[].id", "networkInterfaces[].id"],
    ),
    (
        "Microsoft.Compute/virtualMachines",
        &[
            "networkProfile.networkInterfaces[].id",
            "storageProfile.osDisk.managedDisk.id",
            "storageProfile.dataDisks[].managedDisk.id",
        ],
    ),
    (
        "Microsoft.Network/privateDnsZones/virtualNetworkLinks",
        &["virtualNetwork.id"],
    ),
    (
        "Microsoft.KeyVault/vaults",
        &["tenantId", "accessPolicies[].tenantId", "accessPolicies[].objectId"],
    ),
];

impl IdentifierSchema {
    /// Empty allowlist (nothing beyond the node id is rewritten)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in allowlist for common network and compute resource types
    #[must_use]
    pub fn azure_defaults() -> Self {
        let mut schema = Self::new();
        for (rtype, paths) in AZURE_DEFAULTS {
            for path in *paths {
                // Literal table; every entry parses
                if let Ok(path) = path.parse() {
                    schema.insert(rtype, path);
                }
            }
        }
        schema
    }

    /// Build from a `type → [path]` map, e.g. from configuration
    ///
    /// # Errors
    /// Returns [`AbstractionError::InvalidFieldPath`] for an unparsable path
    pub fn from_map(map: &BTreeMap<String, Vec<String>>) -> Result<Self, AbstractionError> {
        let mut schema = Self::new();
        for (rtype, paths) in map {
            for raw in paths {
                let path = raw
                    .parse()
                    .map_err(|source| AbstractionError::InvalidFieldPath {
                        resource_type: rtype.clone(),
                        source,
                    })?;
                schema.insert(rtype, path);
            }
        }
        Ok(schema)
    }

    /// With one additional field path
    #[must_use]
    pub fn with_field(mut self, resource_type: &str, path: FieldPath) -> Self {
        self.insert(resource_type, path);
        self
    }

    /// Union of both allowlists
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (rtype, paths) in other.fields {
            for path in paths {
                self.insert(&rtype, path);
            }
        }
        self
    }

    fn insert(&mut self, resource_type: &str, path: FieldPath) {
        let paths = self
            .fields
            .entry(resource_type.to_ascii_lowercase())
            .or_default();
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    /// Field paths applying to a type: wildcard entries first, no duplicates
    #[must_use]
    pub fn fields_for(&self, resource_type: &str) -> Vec<&FieldPath> {
        let mut out: Vec<&FieldPath> = Vec::new();
        let specific = self.fields.get(&resource_type.to_ascii_lowercase());
        for path in self
            .fields
            .get(WILDCARD_TYPE)
            .into_iter()
            .chain(specific)
            .flatten()
        {
            if !out.contains(&path) {
                out.push(path);
            }
        }
        out
    }

    /// Number of configured types (wildcard included)
    #[inline]
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.fields.len()
    }

    /// Copy of `properties` with every allowlisted string abstracted
    ///
    /// Missing paths and non-string values are left as they are.
    ///
    /// # Errors
    /// Returns [`AbstractionError::InvalidIdentifier`] if an allowlisted
    /// string is empty or malformed; no partial copy is returned
    pub fn abstract_properties(
        &self,
        abstractor: &IdAbstractor,
        seed: &TenantSeed,
        resource_type: &str,
        properties: &Value,
    ) -> Result<Value, AbstractionError> {
        let mut out = properties.clone();
        for path in self.fields_for(resource_type) {
            path.visit_strings_mut(&mut out, &mut |value: &mut String| {
                let abstracted = abstractor.abstract_id(seed, value)?;
                *value = abstracted.into_inner();
                Ok::<(), AbstractionError>(())
            })?;
        }
        Ok(out)
    }
}
