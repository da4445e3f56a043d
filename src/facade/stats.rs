use serde::Serialize;

/// Counters over the lifetime of a store, plus a few gauges filled in when
/// the snapshot is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub begun: u64,
    pub committed: u64,
    /// Commit calls that had to wait for read dependencies
    pub deferred_commits: u64,
    /// Rollback calls that aborted at least one transaction, implicit ones
    /// included
    pub rollbacks: u64,
    /// Transactions aborted because they read an aborted write
    pub cascaded_aborts: u64,
    pub write_too_late: u64,
    pub duplicate_keys: u64,
    pub versions_created: u64,
    pub versions_removed: u64,

    pub active_transactions: usize,
    pub keys: usize,
    pub live_versions: usize,
}
