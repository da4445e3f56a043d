use super::{Version, VersionChain, VersionInfo};
use crate::core::{DbError, Key, Result, VersionRef};
use std::collections::HashMap;

/// Key → version chain map
pub struct VersionStore {
    chains: HashMap<Key, VersionChain>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self {
            chains: HashMap::new(),
        }
    }

    /// Create the chain for a new key
    pub fn create_chain(&mut self, key: Key, initial: Version) -> Result<()> {
        if self.chains.contains_key(&key) {
            return Err(DbError::DuplicateKey(key));
        }

        self.chains.insert(key, VersionChain::new(key, initial));
        Ok(())
    }

    pub fn contains_key(&self, key: Key) -> bool {
        self.chains.contains_key(&key)
    }

    pub fn chain(&self, key: Key) -> Result<&VersionChain> {
        self.chains.get(&key).ok_or(DbError::NoSuchKey(key))
    }

    pub fn chain_mut(&mut self, key: Key) -> Result<&mut VersionChain> {
        self.chains.get_mut(&key).ok_or(DbError::NoSuchKey(key))
    }

    /// Look up one exact version
    pub fn version_mut(&mut self, vref: VersionRef) -> Option<&mut Version> {
        self.chains
            .get_mut(&vref.key)
            .and_then(|chain| chain.get_mut(vref.write_ts))
    }

    /// Remove one exact version. A chain left without versions is dropped,
    /// so the key stops existing.
    pub fn remove_version(&mut self, vref: VersionRef) -> Option<Version> {
        let chain = self.chains.get_mut(&vref.key)?;
        let removed = chain.remove(vref.write_ts);
        if chain.is_empty() {
            self.chains.remove(&vref.key);
        }
        removed
    }

    /// Snapshot of a key's versions in write-timestamp order
    pub fn versions(&self, key: Key) -> Option<Vec<VersionInfo>> {
        self.chains.get(&key).map(VersionChain::infos)
    }

    /// Keys in ascending order
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.chains.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Total number of versions over all keys
    pub fn version_count(&self) -> usize {
        self.chains.values().map(VersionChain::len).sum()
    }
}

impl Default for VersionStore {
    fn default() -> Self {
        Self::new()
    }
}
