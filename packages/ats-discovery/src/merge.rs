//! Discovered URL sets and the merge against persisted state.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

use crate::matcher::CanonicalUrl;

/// A set of canonical URLs, unique by string equality.
///
/// Backed by an ordered set so iteration and serialization are always
/// sorted, whatever order search results arrived in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredSet {
    urls: BTreeSet<CanonicalUrl>,
}

impl DiscoveredSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a URL; returns true if it was not already present.
    pub fn insert(&mut self, url: CanonicalUrl) -> bool {
        self.urls.insert(url)
    }

    /// Add every URL from `other`, returning how many were new.
    pub fn absorb(&mut self, other: DiscoveredSet) -> usize {
        let before = self.urls.len();
        self.urls.extend(other.urls);
        self.urls.len() - before
    }

    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// URLs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalUrl> {
        self.urls.iter()
    }

    /// `self ∪ other`
    pub fn union(&self, other: &DiscoveredSet) -> DiscoveredSet {
        self.urls.union(&other.urls).cloned().collect()
    }

    /// `self − other`
    pub fn difference(&self, other: &DiscoveredSet) -> DiscoveredSet {
        self.urls.difference(&other.urls).cloned().collect()
    }
}

impl FromIterator<CanonicalUrl> for DiscoveredSet {
    fn from_iter<I: IntoIterator<Item = CanonicalUrl>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for DiscoveredSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(CanonicalUrl::from).collect()
    }
}

impl IntoIterator for DiscoveredSet {
    type Item = CanonicalUrl;
    type IntoIter = std::collections::btree_set::IntoIter<CanonicalUrl>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.into_iter()
    }
}

impl Serialize for DiscoveredSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.urls.iter())
    }
}

/// Result of merging a session's discoveries into existing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Everything to persist: `existing ∪ session`
    pub combined: DiscoveredSet,
    /// Reporting only: `session − existing`
    pub new_only: DiscoveredSet,
}

/// Merge session results with the state loaded at run start.
pub fn merge(existing: &DiscoveredSet, session: &DiscoveredSet) -> MergeOutcome {
    MergeOutcome {
        combined: existing.union(session),
        new_only: session.difference(existing),
    }
}
