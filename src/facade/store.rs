// ============================================================================
// MVTO Store
// ============================================================================
//
// Protocol rules, per operation:
// - read:  see the version with the greatest write ts <= own ts, raise its
//          read ts, become a dependant of it
// - write: if a younger transaction already read the visible version the
//          write is too late and the writer is rolled back; otherwise update
//          the own version in place or add a new one
// - commit: finalize only when no read dependency is pending; finalizing
//          releases the dependants of every written version, which may in
//          turn finalize deferred commits
//
// Every public method is one atomic step over the key map and the
// transaction table.
//
// ============================================================================

use super::StoreStats;
use crate::config::StoreConfig;
use crate::core::{DbError, Key, Result, TransactionId, Value, VersionRef};
use crate::storage::{Version, VersionInfo, VersionStore};
use crate::transaction::{
    RollbackEngine, RollbackReport, Transaction, TransactionInfo, TransactionTable,
};
use std::collections::VecDeque;
use tracing::{Level, event};

/// Result of a successful `commit` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    /// The transaction is finalized and no longer active
    Committed,

    /// Read dependencies are pending; the transaction commits as soon as the
    /// last of them is released
    Deferred,
}

pub struct MvtoStore {
    config: StoreConfig,
    storage: VersionStore,
    transactions: TransactionTable,
    stats: StoreStats,
}

impl Default for MvtoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MvtoStore {
    pub fn new() -> Self {
        Self::build(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: StoreConfig) -> Self {
        let transactions =
            TransactionTable::new(config.first_timestamp, config.max_active_transactions);
        Self {
            config,
            storage: VersionStore::new(),
            transactions,
            stats: StoreStats::default(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Transaction lifecycle
    // ------------------------------------------------------------------------

    /// Start a transaction; its id is its timestamp
    pub fn begin(&mut self) -> Result<TransactionId> {
        let txn = self.transactions.begin()?;
        self.stats.begun += 1;
        event!(Level::DEBUG, store = %self.config.name, txn = %txn, "begin");
        Ok(txn)
    }

    /// Commit, or defer the commit while read dependencies are pending
    pub fn commit(&mut self, txn: TransactionId) -> Result<CommitStatus> {
        let transaction = self.transactions.get_mut(txn)?;
        transaction.request_commit();

        if transaction.wait_count() > 0 {
            self.stats.deferred_commits += 1;
            event!(
                Level::DEBUG,
                store = %self.config.name,
                txn = %txn,
                waiting_on = transaction.wait_count(),
                "commit deferred"
            );
            return Ok(CommitStatus::Deferred);
        }

        self.finalize_commits(txn);
        Ok(CommitStatus::Committed)
    }

    /// Abort `txn` and, transitively, every reader of its writes.
    /// Rolling back an inactive id does nothing.
    pub fn rollback(&mut self, txn: TransactionId) -> RollbackReport {
        let report = RollbackEngine::new(&mut self.transactions, &mut self.storage).run(txn);

        if !report.is_noop() {
            self.stats.rollbacks += 1;
            self.stats.cascaded_aborts += report.cascaded().len() as u64;
            self.stats.versions_removed += report.versions_removed as u64;
            event!(
                Level::INFO,
                store = %self.config.name,
                txn = %txn,
                cascaded = report.cascaded().len(),
                versions_removed = report.versions_removed,
                "rolled back"
            );
        }
        report
    }

    fn finalize_commits(&mut self, first: TransactionId) {
        let mut worklist = VecDeque::from([first]);

        while let Some(id) = worklist.pop_front() {
            if !self
                .transactions
                .get(id)
                .is_ok_and(Transaction::can_finalize)
            {
                continue;
            }
            let Some(mut txn) = self.transactions.remove(id) else {
                continue;
            };

            for vref in txn.mark_committed() {
                let Some(version) = self
                    .storage
                    .chain(vref.key)
                    .ok()
                    .and_then(|chain| chain.get(vref.write_ts))
                else {
                    continue;
                };

                for &dependant in version.dependants() {
                    if dependant == id {
                        continue;
                    }
                    if let Ok(reader) = self.transactions.get_mut(dependant)
                        && reader.release_wait() == 0
                        && reader.commit_requested()
                    {
                        worklist.push_back(dependant);
                    }
                }
            }

            self.stats.committed += 1;
            event!(
                Level::INFO,
                store = %self.config.name,
                txn = %id,
                propagated = id != first,
                "committed"
            );
        }
    }

    // ------------------------------------------------------------------------
    // Key-value operations
    // ------------------------------------------------------------------------

    /// Create a key with its first version
    pub fn insert(&mut self, txn: TransactionId, key: Key, value: Value) -> Result<()> {
        self.transactions.get(txn)?;

        if self.storage.contains_key(key) {
            self.stats.duplicate_keys += 1;
            event!(Level::WARN, store = %self.config.name, txn = %txn, key, "duplicate key");
            self.rollback(txn);
            return Err(DbError::DuplicateKey(key));
        }

        self.storage.create_chain(key, Version::initial(txn, value))?;
        self.transactions
            .get_mut(txn)?
            .record_write(VersionRef::new(key, txn));
        self.stats.versions_created += 1;

        event!(Level::DEBUG, store = %self.config.name, txn = %txn, key, value, "insert");
        Ok(())
    }

    /// Read the version visible at the transaction's timestamp
    pub fn read(&mut self, txn: TransactionId, key: Key) -> Result<Value> {
        let chain = self.storage.chain_mut(key)?;
        self.transactions.get(txn)?;

        let version = chain.visible_mut(txn).ok_or(DbError::NoSuchKey(key))?;
        let writer = version.write_ts();
        let newly_registered = version.observe_read(txn);
        let content = version.content();

        // A reader depends on the writer's fate only while the writer is
        // undecided, and never on itself.
        let depends = newly_registered && writer != txn && self.transactions.is_active(writer);

        let reader = self.transactions.get_mut(txn)?;
        if newly_registered {
            reader.record_read(VersionRef::new(key, writer));
        }
        if depends {
            reader.add_wait();
        }

        event!(
            Level::DEBUG,
            store = %self.config.name,
            txn = %txn,
            key,
            wts = writer.as_u64(),
            depends,
            "read"
        );
        Ok(content)
    }

    /// Write a new value under timestamp ordering
    pub fn write(&mut self, txn: TransactionId, key: Key, value: Value) -> Result<()> {
        let (write_ts, read_ts) = {
            let chain = self.storage.chain(key)?;
            self.transactions.get(txn)?;
            let visible = chain.visible(txn).ok_or(DbError::NoSuchKey(key))?;
            (visible.write_ts(), visible.read_ts())
        };

        if txn.as_u64() < read_ts {
            self.stats.write_too_late += 1;
            event!(
                Level::WARN,
                store = %self.config.name,
                txn = %txn,
                key,
                rts = read_ts,
                "write too late"
            );
            self.rollback(txn);
            return Err(DbError::WriteTooLate { txn, key, read_ts });
        }

        let chain = self.storage.chain_mut(key)?;
        if write_ts == txn {
            if let Some(own) = chain.get_mut(write_ts) {
                own.set_content(value);
            }
            event!(Level::DEBUG, store = %self.config.name, txn = %txn, key, value, "write in place");
            return Ok(());
        }

        let inserted = chain.insert(Version::written(txn, value));
        debug_assert!(inserted, "visible version would have been the own version");
        self.transactions
            .get_mut(txn)?
            .record_write(VersionRef::new(key, txn));
        self.stats.versions_created += 1;

        event!(
            Level::DEBUG,
            store = %self.config.name,
            txn = %txn,
            key,
            value,
            after_wts = write_ts.as_u64(),
            "write new version"
        );
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    pub fn is_active(&self, txn: TransactionId) -> bool {
        self.transactions.is_active(txn)
    }

    pub fn transaction_info(&self, txn: TransactionId) -> Option<TransactionInfo> {
        self.transactions.info(txn)
    }

    pub fn active_transactions(&self) -> Vec<TransactionId> {
        self.transactions.active_ids()
    }

    /// Versions of `key` in write-timestamp order
    pub fn versions(&self, key: Key) -> Option<Vec<VersionInfo>> {
        self.storage.versions(key)
    }

    pub fn keys(&self) -> Vec<Key> {
        self.storage.keys()
    }

    pub fn key_count(&self) -> usize {
        self.storage.len()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            active_transactions: self.transactions.len(),
            keys: self.storage.len(),
            live_versions: self.storage.version_count(),
            ..self.stats
        }
    }
}
