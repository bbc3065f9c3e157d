//! Lineage of seed identities
//!
//! Every identity of the initial labeling is a root. Identities created by
//! later splits are appended to the list of the root whose lineage already
//! holds their parent, so each root maps to itself followed by all of its
//! descendants in creation order.

use crate::error::{SeedError, SeedResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root identity -> every identity descended from it, root first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AncestryMap {
    lineages: BTreeMap<u32, Vec<u32>>,
}

impl AncestryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// One root per identity; identity 0 is skipped.
    pub fn seed(roots: impl IntoIterator<Item = u32>) -> Self {
        let lineages = roots
            .into_iter()
            .filter(|&r| r != 0)
            .map(|r| (r, vec![r]))
            .collect();
        Self { lineages }
    }

    /// Append `child` to the lineage holding `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::AncestryLookupFailure`] if no lineage holds
    /// `parent`.
    pub fn register(&mut self, parent: u32, child: u32) -> SeedResult<u32> {
        let (&root, lineage) = self
            .lineages
            .iter_mut()
            .find(|(_, ids)| ids.contains(&parent))
            .ok_or(SeedError::AncestryLookupFailure { parent })?;
        lineage.push(child);
        Ok(root)
    }

    /// Root whose lineage holds `id`.
    pub fn root_of(&self, id: u32) -> Option<u32> {
        self.lineages
            .iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(&root, _)| root)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.root_of(id).is_some()
    }

    pub fn lineage(&self, root: u32) -> Option<&[u32]> {
        self.lineages.get(&root).map(Vec::as_slice)
    }

    pub fn roots(&self) -> impl Iterator<Item = u32> + '_ {
        self.lineages.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u32])> + '_ {
        self.lineages.iter().map(|(&r, ids)| (r, ids.as_slice()))
    }

    /// Number of roots.
    pub fn len(&self) -> usize {
        self.lineages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
    }

    /// Total identities tracked, roots included.
    pub fn identity_count(&self) -> usize {
        self.lineages.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_skips_background() {
        let map = AncestryMap::seed([0, 1, 2]);
        assert_eq!(map.len(), 2);
        assert!(!map.contains(0));
        assert_eq!(map.lineage(2), Some(&[2][..]));
    }

    #[test]
    fn test_register_chain() {
        let mut map = AncestryMap::seed([1, 2]);
        assert_eq!(map.register(1, 3).unwrap(), 1);
        assert_eq!(map.register(1, 4).unwrap(), 1);
        // Grandchild goes under the same root
        assert_eq!(map.register(4, 5).unwrap(), 1);
        assert_eq!(map.lineage(1), Some(&[1, 3, 4, 5][..]));
        assert_eq!(map.root_of(5), Some(1));
        assert_eq!(map.identity_count(), 5);
    }

    #[test]
    fn test_register_unknown_parent() {
        let mut map = AncestryMap::seed([1]);
        assert!(matches!(
            map.register(9, 10),
            Err(SeedError::AncestryLookupFailure { parent: 9 })
        ));
    }

    #[test]
    fn test_json_shape() {
        let mut map = AncestryMap::seed([1, 2]);
        map.register(2, 3).unwrap();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1":[1],"2":[2,3]}"#);
        let back: AncestryMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
