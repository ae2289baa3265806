//! Declarative configuration tree
//!
//! A generated deployment configuration in its JSON form:
//!
//! ```json
//! {
//!   "terraform": { "required_providers": { ... } },
//!   "provider": { "azurerm": { "features": {} } },
//!   "resource": { "<type>": { "<name>": { ...body... } } }
//! }
//! ```
//!
//! Everything except the `resource` block is "shared" boilerplate that each
//! partition must carry its own copy of.

use crate::error::ModelError;
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Top-level key holding resource declarations
pub const RESOURCE_KEY: &str = "resource";

/// Ordering-constraint attribute on resource bodies
pub const DEPENDS_ON_KEY: &str = "depends_on";

/// `type.name` address of a resource declaration
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceAddress {
    /// Resource type (e.g. `azurerm_virtual_network`)
    pub resource_type: String,
    /// Declaration name
    pub name: String,
}

impl ResourceAddress {
    /// Create an address
    #[inline]
    #[must_use]
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl Display for ResourceAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

impl FromStr for ResourceAddress {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((rtype, name)) if !rtype.is_empty() && !name.is_empty() => {
                Ok(Self::new(rtype, name))
            }
            _ => Err(ModelError::InvalidAddress(s.to_string())),
        }
    }
}

/// Generated configuration with typed access to resource declarations
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    root: Map<String, Value>,
}

impl ConfigTree {
    /// Wrap a JSON value
    ///
    /// # Errors
    /// Returns error if the root, the resource block, or any type block is
    /// not an object
    pub fn new(value: Value) -> Result<Self, ModelError> {
        let Value::Object(root) = value else {
            return Err(ModelError::InvalidConfig("root must be an object".into()));
        };

        if let Some(resources) = root.get(RESOURCE_KEY) {
            let Value::Object(types) = resources else {
                return Err(ModelError::InvalidConfig(
                    "'resource' must be an object".into(),
                ));
            };
            for (rtype, entries) in types {
                let Value::Object(entries) = entries else {
                    return Err(ModelError::InvalidConfig(format!(
                        "resource type '{rtype}' must map names to bodies"
                    )));
                };
                if let Some((name, _)) = entries.iter().find(|(_, body)| !body.is_object()) {
                    return Err(ModelError::InvalidConfig(format!(
                        "resource '{rtype}.{name}' body must be an object"
                    )));
                }
            }
        }

        Ok(Self { root })
    }

    /// Parse from JSON text
    ///
    /// # Errors
    /// Returns error if JSON is invalid or the shape is wrong
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(json)?;
        Self::new(value)
    }

    /// Assemble a tree from shared blocks and resource declarations
    #[must_use]
    pub fn assemble(
        shared: Map<String, Value>,
        resources: impl IntoIterator<Item = (ResourceAddress, Value)>,
    ) -> Self {
        let mut root = shared;
        root.remove(RESOURCE_KEY);
        let mut types: Map<String, Value> = Map::new();
        for (address, body) in resources {
            let entries = types
                .entry(address.resource_type)
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(entries) = entries {
                entries.insert(address.name, body);
            }
        }
        root.insert(RESOURCE_KEY.to_string(), Value::Object(types));
        Self { root }
    }

    /// All resource declarations in `(type, name)` order
    #[must_use]
    pub fn resources(&self) -> Vec<(ResourceAddress, &Value)> {
        let Some(Value::Object(types)) = self.root.get(RESOURCE_KEY) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (rtype, entries) in types {
            if let Value::Object(entries) = entries {
                for (name, body) in entries {
                    out.push((ResourceAddress::new(rtype, name), body));
                }
            }
        }
        out
    }

    /// All addresses in `(type, name)` order
    #[must_use]
    pub fn addresses(&self) -> Vec<ResourceAddress> {
        self.resources().into_iter().map(|(addr, _)| addr).collect()
    }

    /// Declarations of a single type
    #[must_use]
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<(ResourceAddress, &Value)> {
        self.root
            .get(RESOURCE_KEY)
            .and_then(|types| types.get(resource_type))
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(name, body)| (ResourceAddress::new(resource_type, name), body))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up one declaration
    #[must_use]
    pub fn resource(&self, address: &ResourceAddress) -> Option<&Value> {
        self.root
            .get(RESOURCE_KEY)?
            .get(&address.resource_type)?
            .get(&address.name)
    }

    /// Look up one declaration mutably
    pub fn resource_mut(&mut self, address: &ResourceAddress) -> Option<&mut Value> {
        self.root
            .get_mut(RESOURCE_KEY)?
            .get_mut(&address.resource_type)?
            .get_mut(&address.name)
    }

    /// Insert or replace a declaration
    pub fn insert_resource(&mut self, address: ResourceAddress, body: Value) {
        let types = self
            .root
            .entry(RESOURCE_KEY.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(types) = types {
            let entries = types
                .entry(address.resource_type)
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(entries) = entries {
                entries.insert(address.name, body);
            }
        }
    }

    /// Whether a declaration exists
    #[inline]
    #[must_use]
    pub fn contains(&self, address: &ResourceAddress) -> bool {
        self.resource(address).is_some()
    }

    /// Number of resource declarations
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.root
            .get(RESOURCE_KEY)
            .and_then(Value::as_object)
            .map(|types| {
                types
                    .values()
                    .filter_map(Value::as_object)
                    .map(Map::len)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Every top-level block except `resource`
    #[must_use]
    pub fn shared_blocks(&self) -> Map<String, Value> {
        self.root
            .iter()
            .filter(|(key, _)| key.as_str() != RESOURCE_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Borrow the root object
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Consume into a JSON value
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Pretty-printed JSON text
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ConfigTree {
        ConfigTree::new(json!({
            "provider": {"azurerm": {"features": {}}},
            "resource": {
                "azurerm_virtual_network": {"vnet1": {"name": "vnet1"}},
                "azurerm_subnet": {"subnet1": {"name": "subnet1"}, "subnet2": {"name": "subnet2"}}
            }
        }))
        .unwrap()
    }

    #[test]
    fn resources_are_ordered() {
        let tree = sample();
        let addresses: Vec<String> = tree.addresses().iter().map(ToString::to_string).collect();
        assert_eq!(
            addresses,
            vec![
                "azurerm_subnet.subnet1",
                "azurerm_subnet.subnet2",
                "azurerm_virtual_network.vnet1"
            ]
        );
        assert_eq!(tree.resource_count(), 3);
    }

    #[test]
    fn shared_blocks_exclude_resources() {
        let shared = sample().shared_blocks();
        assert!(shared.contains_key("provider"));
        assert!(!shared.contains_key(RESOURCE_KEY));
    }

    #[test]
    fn rejects_non_object_bodies() {
        let result = ConfigTree::new(json!({"resource": {"t": {"n": 1}}}));
        assert!(matches!(result, Err(ModelError::InvalidConfig(_))));
        assert!(ConfigTree::new(json!([])).is_err());
    }

    #[test]
    fn assemble_and_insert() {
        let mut tree = ConfigTree::assemble(
            sample().shared_blocks(),
            vec![(ResourceAddress::new("t", "a"), json!({"x": 1}))],
        );
        tree.insert_resource(ResourceAddress::new("t", "b"), json!({}));
        assert_eq!(tree.resource_count(), 2);
        assert_eq!(tree.resource(&"t.a".parse().unwrap()), Some(&json!({"x": 1})));
        assert!(tree.as_map().contains_key("provider"));
    }

    #[test]
    fn address_parsing() {
        let addr: ResourceAddress = "azurerm_subnet.s1".parse().unwrap();
        assert_eq!(addr, ResourceAddress::new("azurerm_subnet", "s1"));
        assert!("nodot".parse::<ResourceAddress>().is_err());
        assert!(".x".parse::<ResourceAddress>().is_err());
    }
}
