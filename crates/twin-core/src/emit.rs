//! Emitter seam
//!
//! Emitters render the abstracted graph into a declarative configuration.
//! They read the abstracted view only; original nodes never reach output.

use crate::error::ReplicaError;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Debug;
use twin_graph::AbstractedView;
use twin_model::{AbstractedId, ConfigTree, ResourceAddress};

/// Configuration plus where each abstracted node ended up
#[derive(Debug, Clone)]
pub struct EmittedConfig {
    pub config: ConfigTree,
    pub addresses: BTreeMap<AbstractedId, ResourceAddress>,
}

impl EmittedConfig {
    /// Declaration of one abstracted node
    #[must_use]
    pub fn address_of(&self, id: &AbstractedId) -> Option<&ResourceAddress> {
        self.addresses.get(id)
    }
}

/// Renders abstracted nodes into a configuration
pub trait ConfigEmitter: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// # Errors
    /// Node cannot be expressed in the target syntax
    fn emit(&self, view: &AbstractedView<'_>) -> Result<EmittedConfig, ReplicaError>;
}

/// Generic emitter: one declaration per node, properties copied as-is
///
/// Provider types map to configuration types through an explicit table;
/// unmapped types fall back to a lowercased, underscore-joined form.
#[derive(Debug, Clone, Default)]
pub struct BasicEmitter {
    types: HashMap<String, String>,
    shared: Map<String, Value>,
}

impl BasicEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a provider type (`Microsoft.Network/virtualNetworks`) to a
    /// configuration type (`azurerm_virtual_network`)
    #[must_use]
    pub fn with_type(mut self, provider_type: &str, config_type: impl Into<String>) -> Self {
        self.types
            .insert(provider_type.to_ascii_lowercase(), config_type.into());
        self
    }

    /// Top-level blocks copied into every emitted configuration
    ///
    /// Non-object values are ignored.
    #[must_use]
    pub fn with_shared_blocks(mut self, shared: Value) -> Self {
        if let Value::Object(map) = shared {
            self.shared = map;
        }
        self
    }

    fn config_type(&self, provider_type: &str) -> String {
        self.types
            .get(&provider_type.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| identifier(provider_type))
    }
}

impl ConfigEmitter for BasicEmitter {
    fn name(&self) -> &str {
        "basic"
    }

    fn emit(&self, view: &AbstractedView<'_>) -> Result<EmittedConfig, ReplicaError> {
        let mut declarations: Vec<(ResourceAddress, Value)> = Vec::with_capacity(view.node_count());
        let mut addresses = BTreeMap::new();
        let mut taken: HashSet<ResourceAddress> = HashSet::new();

        for node in view.iter() {
            let body = &node.body;
            let base = ResourceAddress::new(self.config_type(&body.resource_type), identifier(&body.name));
            let mut address = base.clone();
            let mut suffix = 1;
            while taken.contains(&address) {
                suffix += 1;
                address.name = format!("{}_{suffix}", base.name);
            }
            taken.insert(address.clone());

            let mut out = Map::new();
            out.insert("name".into(), Value::String(body.name.clone()));
            if let Some(location) = &body.location {
                out.insert("location".into(), Value::String(location.clone()));
            }
            if !body.tags.is_empty() {
                out.insert("tags".into(), serde_json::to_value(&body.tags).map_err(|e| {
                    ReplicaError::Emit {
                        emitter: self.name().to_string(),
                        reason: e.to_string(),
                    }
                })?);
            }
            if let Value::Object(properties) = &body.properties {
                for (key, value) in properties {
                    out.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }

            addresses.insert(node.id.clone(), address.clone());
            declarations.push((address, Value::Object(out)));
        }

        tracing::debug!(declarations = declarations.len(), "abstracted graph emitted");
        Ok(EmittedConfig {
            config: ConfigTree::assemble(self.shared.clone(), declarations),
            addresses,
        })
    }
}

/// `Microsoft.Network/virtualNetworks` → `microsoft_network_virtualnetworks`
fn identifier(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_config_safe() {
        assert_eq!(identifier("Microsoft.Network/virtualNetworks"), "microsoft_network_virtualnetworks");
        assert_eq!(identifier("1st-vnet"), "_1st_vnet");
        assert_eq!(identifier(""), "_");
    }
}
