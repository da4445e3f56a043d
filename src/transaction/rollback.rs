// ============================================================================
// Cascading Rollback
// ============================================================================
//
// Aborting a transaction erases every version it wrote. Any transaction that
// read one of those versions observed state that never existed, so it is
// aborted too, transitively. The cascade runs off a FIFO worklist; ids that
// are no longer active are skipped, which makes the whole thing idempotent.
//
// ============================================================================

use super::TransactionTable;
use crate::core::TransactionId;
use crate::storage::VersionStore;
use std::collections::VecDeque;
use tracing::{Level, event};

/// Outcome of one rollback call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    /// Aborted transactions in abort order; the initiator comes first if it
    /// was still active.
    pub aborted: Vec<TransactionId>,
    pub versions_removed: usize,
}

impl RollbackReport {
    /// True if the initiating id was not active (nothing happened)
    pub fn is_noop(&self) -> bool {
        self.aborted.is_empty()
    }

    /// Transactions aborted only because they read aborted writes
    pub fn cascaded(&self) -> &[TransactionId] {
        self.aborted.get(1..).unwrap_or(&[])
    }
}

pub struct RollbackEngine<'a> {
    transactions: &'a mut TransactionTable,
    storage: &'a mut VersionStore,
}

impl<'a> RollbackEngine<'a> {
    pub fn new(transactions: &'a mut TransactionTable, storage: &'a mut VersionStore) -> Self {
        Self {
            transactions,
            storage,
        }
    }

    /// Roll back `initiator` and everything that depends on its writes.
    /// Never fails.
    pub fn run(self, initiator: TransactionId) -> RollbackReport {
        let mut report = RollbackReport::default();
        let mut worklist = VecDeque::from([initiator]);

        while let Some(id) = worklist.pop_front() {
            let Some(mut txn) = self.transactions.remove(id) else {
                continue;
            };
            let (written, reads) = txn.mark_aborted();

            for vref in written {
                let Some(version) = self.storage.remove_version(vref) else {
                    continue;
                };
                report.versions_removed += 1;
                event!(Level::DEBUG, txn = %id, version = %vref, "version removed");

                for &dependant in version.dependants() {
                    if dependant != id {
                        worklist.push_back(dependant);
                    }
                }
            }

            for vref in reads {
                if let Some(version) = self.storage.version_mut(vref) {
                    version.remove_dependant(id);
                }
            }

            if id != initiator {
                event!(Level::INFO, txn = %id, cause = %initiator, "cascading abort");
            }
            report.aborted.push(id);
        }

        report
    }
}
