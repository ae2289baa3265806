//! Community-based configuration splitter
//!
//! Buckets every entry of a configuration into its community, refuses the
//! split if any bucket references another bucket's resources, and renders
//! one self-contained file per community plus a manifest. Nothing is
//! rendered until the scan over every bucket has passed.

use crate::community::CommunitySet;
use crate::error::SplitError;
use crate::index::CommunityIndex;
use crate::manifest::{dominant_type, CommunityManifest, ManifestEntry};
use crate::scan::scan_cross_references;
use serde_json::Value;
use std::collections::BTreeMap;
use twin_model::{ConfigTree, Digest, ResourceAddress};

/// One rendered community file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFile {
    pub index: usize,
    pub file_name: String,
    pub resource_count: usize,
    pub resource_types: BTreeMap<String, usize>,
    pub content: String,
}

/// Files and manifest of a successful split
#[derive(Debug, Clone)]
pub struct SplitOutput {
    pub files: Vec<SplitFile>,
    pub manifest: CommunityManifest,
}

impl SplitOutput {
    /// Community files plus the manifest
    #[inline]
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len() + 1
    }
}

/// Partition `config` along `communities`
///
/// # Errors
/// [`SplitError::CrossCommunityReference`] listing every offending pair if
/// any bucket references a resource outside it; serialization errors
pub fn split(config: &ConfigTree, communities: &CommunitySet) -> Result<SplitOutput, SplitError> {
    let index = CommunityIndex::build(config, communities);

    let violations = scan_cross_references(config, &index);
    if !violations.is_empty() {
        tracing::error!(violations = violations.len(), "cross-community references, split refused");
        return Err(SplitError::CrossCommunityReference { violations });
    }

    let mut buckets: Vec<Vec<(ResourceAddress, Value)>> = vec![Vec::new(); communities.len()];
    for (address, community) in index.assignments() {
        if let (Some(bucket), Some(body)) = (buckets.get_mut(community), config.resource(address)) {
            bucket.push((address.clone(), body.clone()));
        }
    }

    let shared = config.shared_blocks();
    let mut files = Vec::with_capacity(buckets.len());
    let mut entries = Vec::with_capacity(buckets.len());
    for (idx, bucket) in buckets.into_iter().enumerate() {
        let mut resource_types: BTreeMap<String, usize> = BTreeMap::new();
        for (address, _) in &bucket {
            *resource_types.entry(address.resource_type.clone()).or_default() += 1;
        }
        let resource_count = bucket.len();
        let dominant = dominant_type(&resource_types);
        let file_name = file_name(idx, resource_count, dominant.as_deref());
        let content = ConfigTree::assemble(shared.clone(), bucket).to_json_pretty()?;

        entries.push(ManifestEntry {
            index: idx,
            file_name: file_name.clone(),
            resource_count,
            resource_types: resource_types.clone(),
            dominant_type: dominant,
            checksum: Digest::compute(content.as_bytes()),
        });
        files.push(SplitFile {
            index: idx,
            file_name,
            resource_count,
            resource_types,
            content,
        });
    }

    let dropped = index.dropped().iter().map(ToString::to_string).collect();
    let manifest = CommunityManifest::new(entries, dropped);
    tracing::info!(
        communities = manifest.total_communities,
        resources = manifest.total_resources,
        dropped = manifest.dropped_resources.len(),
        "configuration split"
    );
    Ok(SplitOutput { files, manifest })
}

pub(crate) const FILE_PREFIX: &str = "community_";
pub(crate) const FILE_SUFFIX: &str = ".tf.json";

/// `community_007_12res_azurerm_subnet.tf.json`
fn file_name(index: usize, count: usize, dominant: Option<&str>) -> String {
    let dominant: String = dominant
        .unwrap_or("empty")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("{FILE_PREFIX}{index:03}_{count}res_{dominant}{FILE_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_encode_index_count_and_type() {
        assert_eq!(
            file_name(3, 12, Some("azurerm_subnet")),
            "community_003_12res_azurerm_subnet.tf.json"
        );
        assert_eq!(file_name(0, 0, None), "community_000_0res_empty.tf.json");
        assert_eq!(file_name(1, 1, Some("a/b")), "community_001_1res_a_b.tf.json");
    }
}
