//! Split manifest

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use twin_model::Digest;

/// File name of the manifest next to the community files
pub const MANIFEST_FILE: &str = "manifest.json";

/// One community file as recorded in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub index: usize,
    pub file_name: String,
    pub resource_count: usize,
    /// Resource type to count
    pub resource_types: BTreeMap<String, usize>,
    /// Most frequent type, ties broken alphabetically; `None` when empty
    pub dominant_type: Option<String>,
    /// Blake3 digest of the file content
    pub checksum: Digest,
}

/// Description of one split, regenerated every time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityManifest {
    pub generated_at: DateTime<Utc>,
    pub total_communities: usize,
    pub total_resources: usize,
    pub total_input_resources: usize,
    /// `type.name` of every entry that matched no community
    pub dropped_resources: Vec<String>,
    pub communities: Vec<ManifestEntry>,
}

impl CommunityManifest {
    #[must_use]
    pub fn new(entries: Vec<ManifestEntry>, dropped_resources: Vec<String>) -> Self {
        let total_resources: usize = entries.iter().map(|e| e.resource_count).sum();
        Self {
            generated_at: Utc::now(),
            total_communities: entries.len(),
            total_resources,
            total_input_resources: total_resources + dropped_resources.len(),
            dropped_resources,
            communities: entries,
        }
    }

    /// Entry by community index
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&ManifestEntry> {
        self.communities.iter().find(|e| e.index == index)
    }

    /// Totals agree with the entries
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total_communities == self.communities.len()
            && self.total_resources
                == self.communities.iter().map(|e| e.resource_count).sum::<usize>()
            && self.total_input_resources == self.total_resources + self.dropped_resources.len()
    }
}

/// Most frequent key, smallest name on ties
pub(crate) fn dominant_type(histogram: &BTreeMap<String, usize>) -> Option<String> {
    histogram
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(name, _)| name.clone())
}
