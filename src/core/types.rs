use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a stored object.
pub type Key = i64;

/// Content of a version.
pub type Value = i64;

/// Transaction identifier; doubles as the transaction's logical start time.
///
/// Ordering of ids is timestamp ordering: an older transaction always has a
/// smaller id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TransactionId(pub u64);

impl TransactionId {
    /// Get the raw timestamp value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TransactionId {
    fn from(ts: u64) -> Self {
        TransactionId(ts)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn_{}", self.0)
    }
}

/// Address of one version: the key it values and the write timestamp of
/// the transaction that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRef {
    pub key: Key,
    pub write_ts: TransactionId,
}

impl VersionRef {
    pub fn new(key: Key, write_ts: TransactionId) -> Self {
        Self { key, write_ts }
    }
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.key, self.write_ts.0)
    }
}
