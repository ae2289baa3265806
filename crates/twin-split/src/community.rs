//! Disjoint community sets

use crate::error::SplitError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use twin_model::AbstractedId;

/// Ordered list of disjoint id sets
///
/// Position in the list is the community index used in file names and the
/// manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunitySet {
    communities: Vec<BTreeSet<String>>,
}

impl CommunitySet {
    /// Validate and wrap a partition
    ///
    /// # Errors
    /// [`SplitError::OverlappingCommunities`] if an id is listed twice
    pub fn new<C, I>(communities: C) -> Result<Self, SplitError>
    where
        C: IntoIterator<Item = I>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let communities: Vec<BTreeSet<String>> = communities
            .into_iter()
            .map(|ids| ids.into_iter().map(Into::into).collect())
            .collect();

        let mut owner: HashMap<&str, usize> = HashMap::new();
        for (idx, ids) in communities.iter().enumerate() {
            for id in ids {
                if let Some(&first) = owner.get(id.as_str()) {
                    return Err(SplitError::OverlappingCommunities {
                        id: id.clone(),
                        first,
                        second: idx,
                    });
                }
                owner.insert(id, idx);
            }
        }

        Ok(Self { communities })
    }

    /// Wrap detector output keyed by abstracted id
    ///
    /// # Errors
    /// [`SplitError::OverlappingCommunities`] if the detector broke disjointness
    pub fn from_detected(detected: Vec<BTreeSet<AbstractedId>>) -> Result<Self, SplitError> {
        Self::new(
            detected
                .into_iter()
                .map(|ids| ids.into_iter().map(AbstractedId::into_inner)),
        )
    }

    /// Rename every member, keeping members the closure does not map
    #[must_use]
    pub fn relabel<F>(&self, mut label: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        Self {
            communities: self
                .communities
                .iter()
                .map(|ids| {
                    ids.iter()
                        .map(|id| label(id).unwrap_or_else(|| id.clone()))
                        .collect()
                })
                .collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// Communities with their indices
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<String>)> {
        self.communities.iter().enumerate()
    }

    /// Total ids across all communities
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.communities.iter().map(BTreeSet::len).sum()
    }
}
