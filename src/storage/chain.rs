// ============================================================================
// Version Chain
// ============================================================================
//
// All versions of a single key, ordered by write timestamp. The chain is
// keyed by write timestamp, so "strictly increasing, one version per
// timestamp" holds by construction.
//
// ============================================================================

use super::version::{Version, VersionInfo};
use crate::core::{Key, TransactionId};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct VersionChain {
    key: Key,
    versions: BTreeMap<TransactionId, Version>,
}

impl VersionChain {
    /// Create a chain holding only the inserted version
    pub fn new(key: Key, initial: Version) -> Self {
        let mut versions = BTreeMap::new();
        versions.insert(initial.write_ts(), initial);
        Self { key, versions }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// The version a transaction with timestamp `ts` sees: the one with the
    /// greatest write timestamp not after `ts`.
    pub fn visible(&self, ts: TransactionId) -> Option<&Version> {
        self.versions.range(..=ts).next_back().map(|(_, v)| v)
    }

    pub fn visible_mut(&mut self, ts: TransactionId) -> Option<&mut Version> {
        self.versions.range_mut(..=ts).next_back().map(|(_, v)| v)
    }

    pub fn get(&self, write_ts: TransactionId) -> Option<&Version> {
        self.versions.get(&write_ts)
    }

    pub fn get_mut(&mut self, write_ts: TransactionId) -> Option<&mut Version> {
        self.versions.get_mut(&write_ts)
    }

    /// Insert a version at its write timestamp.
    ///
    /// Returns `false` and leaves the chain untouched if a version with the
    /// same write timestamp already exists.
    pub fn insert(&mut self, version: Version) -> bool {
        use std::collections::btree_map::Entry;

        match self.versions.entry(version.write_ts()) {
            Entry::Vacant(slot) => {
                slot.insert(version);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn remove(&mut self, write_ts: TransactionId) -> Option<Version> {
        self.versions.remove(&write_ts)
    }

    /// Versions in write-timestamp order
    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.versions.values()
    }

    pub fn latest(&self) -> Option<&Version> {
        self.versions.values().next_back()
    }

    pub fn infos(&self) -> Vec<VersionInfo> {
        self.iter().map(Version::info).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_with(write_timestamps: &[u64]) -> VersionChain {
        let mut iter = write_timestamps.iter();
        let first = *iter.next().unwrap();
        let mut chain = VersionChain::new(1, Version::initial(TransactionId(first), first as i64));
        for &ts in iter {
            assert!(chain.insert(Version::written(TransactionId(ts), ts as i64)));
        }
        chain
    }

    fn write_timestamps(chain: &VersionChain) -> Vec<u64> {
        chain.iter().map(|v| v.write_ts().as_u64()).collect()
    }

    #[test]
    fn test_visible_is_predecessor() {
        let chain = chain_with(&[2, 5, 9]);

        assert!(chain.visible(TransactionId(1)).is_none());
        assert_eq!(chain.visible(TransactionId(2)).unwrap().content(), 2);
        assert_eq!(chain.visible(TransactionId(4)).unwrap().content(), 2);
        assert_eq!(chain.visible(TransactionId(5)).unwrap().content(), 5);
        assert_eq!(chain.visible(TransactionId(8)).unwrap().content(), 5);
        assert_eq!(chain.visible(TransactionId(100)).unwrap().content(), 9);
    }

    #[test]
    fn test_out_of_order_insert_keeps_order() {
        let chain = chain_with(&[1, 10, 4, 7]);
        assert_eq!(write_timestamps(&chain), vec![1, 4, 7, 10]);
        assert_eq!(chain.latest().unwrap().write_ts(), TransactionId(10));
    }

    #[test]
    fn test_duplicate_write_ts_rejected() {
        let mut chain = chain_with(&[1, 3]);
        assert!(!chain.insert(Version::written(TransactionId(3), 99)));
        assert_eq!(chain.get(TransactionId(3)).unwrap().content(), 3);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_remove_exact_version() {
        let mut chain = chain_with(&[1, 3, 6]);
        let removed = chain.remove(TransactionId(3)).unwrap();
        assert_eq!(removed.content(), 3);
        assert!(chain.remove(TransactionId(3)).is_none());
        assert_eq!(write_timestamps(&chain), vec![1, 6]);

        // the older version becomes visible again
        assert_eq!(chain.visible(TransactionId(4)).unwrap().content(), 1);
    }

    #[test]
    fn test_visible_mut_updates_in_place() {
        let mut chain = chain_with(&[1, 3]);
        chain.visible_mut(TransactionId(3)).unwrap().set_content(30);
        assert_eq!(chain.get(TransactionId(3)).unwrap().content(), 30);
        assert_eq!(chain.infos().len(), 2);
    }
}
