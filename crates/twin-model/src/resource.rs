//! Resource and relationship records as handed over by discovery

use crate::ids::{OriginalId, TenantId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Non-identifying resource fields shared by both representations
///
/// `properties` is an arbitrary JSON bag; identifier-shaped fields inside it
/// are rewritten on the abstracted side only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBody {
    /// Provider resource type (e.g. `Microsoft.Network/virtualNetworks`)
    pub resource_type: String,
    /// Display name
    pub name: String,
    /// Region / location
    #[serde(default)]
    pub location: Option<String>,
    /// Property bag
    #[serde(default)]
    pub properties: Value,
    /// Tag map
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ResourceBody {
    /// Create a body with empty properties and tags
    #[must_use]
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            location: None,
            properties: Value::Object(Map::new()),
            tags: BTreeMap::new(),
        }
    }

    /// With location
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// With property bag
    #[must_use]
    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    /// With a single tag
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// A discovered resource record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredResource {
    /// Real identifier issued by the source cloud
    pub original_id: OriginalId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Everything else
    #[serde(flatten)]
    pub body: ResourceBody,
}

impl DiscoveredResource {
    /// Create a resource record
    #[must_use]
    pub fn new(
        original_id: impl Into<OriginalId>,
        tenant_id: impl Into<TenantId>,
        body: ResourceBody,
    ) -> Self {
        Self {
            original_id: original_id.into(),
            tenant_id: tenant_id.into(),
            body,
        }
    }
}

/// A discovered relationship between two original resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredRelationship {
    /// Source endpoint
    pub from_id: OriginalId,
    /// Target endpoint
    pub to_id: OriginalId,
    /// Relationship type (e.g. `CONTAINS`, `CONNECTED_TO`)
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Optional edge properties
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl DiscoveredRelationship {
    /// Create a relationship without properties
    #[must_use]
    pub fn new(
        from_id: impl Into<OriginalId>,
        to_id: impl Into<OriginalId>,
        rel_type: impl Into<String>,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            rel_type: rel_type.into(),
            properties: Map::new(),
        }
    }

    /// With a single edge property
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_deserializes_flat_record() {
        let record = json!({
            "original_id": "/subscriptions/s1/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm1",
            "tenant_id": "t1",
            "resource_type": "Microsoft.Compute/virtualMachines",
            "name": "vm1",
            "location": "westeurope",
            "properties": {"hardwareProfile": {"vmSize": "Standard_B2s"}},
            "tags": {"env": "dev"}
        });
        let resource: DiscoveredResource = serde_json::from_value(record).unwrap();
        assert_eq!(resource.body.name, "vm1");
        assert_eq!(resource.tenant_id.as_str(), "t1");
        assert_eq!(resource.body.tags.get("env").map(String::as_str), Some("dev"));
    }

    #[test]
    fn relationship_type_field_is_renamed() {
        let rel: DiscoveredRelationship =
            serde_json::from_value(json!({"from_id": "a", "to_id": "b", "type": "CONTAINS"}))
                .unwrap();
        assert_eq!(rel.rel_type, "CONTAINS");
        assert!(rel.properties.is_empty());
    }
}
