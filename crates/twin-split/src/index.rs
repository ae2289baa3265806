//! Reverse index from configuration entries to communities
//!
//! Detector ids and configuration labels rarely agree exactly, so each
//! entry is looked up by its declared `id`, then by `type.name`, then by its
//! bare name. The first hit wins.

use crate::community::CommunitySet;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use twin_model::{ConfigTree, ResourceAddress};

/// Community assignment of every configuration entry
#[derive(Debug, Clone, Default)]
pub struct CommunityIndex {
    assignments: BTreeMap<ResourceAddress, usize>,
    dropped: Vec<ResourceAddress>,
    by_name: HashMap<String, Vec<ResourceAddress>>,
}

impl CommunityIndex {
    #[must_use]
    pub fn build(config: &ConfigTree, communities: &CommunitySet) -> Self {
        let owner: HashMap<&str, usize> = communities
            .iter()
            .flat_map(|(idx, ids)| ids.iter().map(move |id| (id.as_str(), idx)))
            .collect();

        let mut index = Self::default();
        for (address, body) in config.resources() {
            index
                .by_name
                .entry(address.name.clone())
                .or_default()
                .push(address.clone());

            let declared_id = body.get("id").and_then(Value::as_str);
            let qualified = address.to_string();
            let hit = declared_id
                .and_then(|id| owner.get(id))
                .or_else(|| owner.get(qualified.as_str()))
                .or_else(|| owner.get(address.name.as_str()))
                .copied();

            match hit {
                Some(community) => {
                    index.assignments.insert(address, community);
                }
                None => {
                    tracing::warn!(%address, "resource matches no community, dropping");
                    index.dropped.push(address);
                }
            }
        }
        index
    }

    /// Community of an entry, `None` if it was dropped or is unknown
    #[inline]
    #[must_use]
    pub fn community_of(&self, address: &ResourceAddress) -> Option<usize> {
        self.assignments.get(address).copied()
    }

    /// Every assigned entry in address order
    pub fn assignments(&self) -> impl Iterator<Item = (&ResourceAddress, usize)> {
        self.assignments.iter().map(|(a, c)| (a, *c))
    }

    #[inline]
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.assignments.len()
    }

    /// Entries that resolved to no community
    #[inline]
    #[must_use]
    pub fn dropped(&self) -> &[ResourceAddress] {
        &self.dropped
    }

    /// Entries declared under a bare name, in address order
    #[must_use]
    pub fn named(&self, name: &str) -> &[ResourceAddress] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}
