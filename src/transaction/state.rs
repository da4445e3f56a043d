// ============================================================================
// Transaction State Management
// ============================================================================
//
// A transaction moves through Active -> Committed/Aborted. While active it
// tracks:
// - the versions it created (undone on rollback, released on commit)
// - the versions it read (so an abort can unregister it as a dependant)
// - its wait count: how many read dependencies are still unresolved
//
// ============================================================================

use crate::core::{TransactionId, VersionRef};

/// Transaction state
///
/// State transitions:
/// ```text
/// Active ──commit──> Committed
///   │
///   └──rollback──> Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is active and can execute operations
    Active,

    /// Transaction has been committed
    Committed,

    /// Transaction has been aborted/rolled back
    Aborted,
}

impl TransactionState {
    pub fn is_active(&self) -> bool {
        matches!(self, TransactionState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Committed | TransactionState::Aborted
        )
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionState::Active => write!(f, "ACTIVE"),
            TransactionState::Committed => write!(f, "COMMITTED"),
            TransactionState::Aborted => write!(f, "ABORTED"),
        }
    }
}

/// A transaction under MVTO
#[derive(Debug)]
pub struct Transaction {
    /// Unique identifier and logical start time
    id: TransactionId,

    state: TransactionState,

    /// Versions created by this transaction, in creation order
    written: Vec<VersionRef>,

    /// Versions this transaction is registered on as a dependant
    reads: Vec<VersionRef>,

    /// Unresolved read dependencies; commit finalizes only at zero
    wait_count: usize,

    /// Set when commit was requested while `wait_count > 0`
    commit_requested: bool,
}

impl Transaction {
    pub fn new(id: TransactionId) -> Self {
        Self {
            id,
            state: TransactionState::Active,
            written: Vec::new(),
            reads: Vec::new(),
            wait_count: 0,
            commit_requested: false,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn written(&self) -> &[VersionRef] {
        &self.written
    }

    pub fn reads(&self) -> &[VersionRef] {
        &self.reads
    }

    pub fn wait_count(&self) -> usize {
        self.wait_count
    }

    pub fn commit_requested(&self) -> bool {
        self.commit_requested
    }

    /// Ready to finalize: commit was asked for and nothing is pending
    pub fn can_finalize(&self) -> bool {
        self.state.is_active() && self.commit_requested && self.wait_count == 0
    }

    pub fn record_write(&mut self, vref: VersionRef) {
        self.written.push(vref);
    }

    pub fn record_read(&mut self, vref: VersionRef) {
        self.reads.push(vref);
    }

    pub fn add_wait(&mut self) {
        self.wait_count += 1;
    }

    /// Resolve one dependency. Returns the remaining wait count.
    pub fn release_wait(&mut self) -> usize {
        self.wait_count = self.wait_count.saturating_sub(1);
        self.wait_count
    }

    pub fn request_commit(&mut self) {
        self.commit_requested = true;
    }

    /// Mark committed and hand back the versions whose dependants must be
    /// released.
    pub fn mark_committed(&mut self) -> Vec<VersionRef> {
        self.state = TransactionState::Committed;
        self.reads.clear();
        std::mem::take(&mut self.written)
    }

    /// Mark aborted and hand back (written, read) versions for undo.
    pub fn mark_aborted(&mut self) -> (Vec<VersionRef>, Vec<VersionRef>) {
        self.state = TransactionState::Aborted;
        (
            std::mem::take(&mut self.written),
            std::mem::take(&mut self.reads),
        )
    }

    pub fn info(&self) -> TransactionInfo {
        TransactionInfo {
            id: self.id,
            state: self.state,
            wait_count: self.wait_count,
            commit_requested: self.commit_requested,
            written: self.written.len(),
            reads: self.reads.len(),
        }
    }
}

/// Snapshot of a transaction's bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    pub id: TransactionId,
    pub state: TransactionState,
    pub wait_count: usize,
    pub commit_requested: bool,
    pub written: usize,
    pub reads: usize,
}
