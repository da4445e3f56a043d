// ============================================================================
// Transaction Management Module
// ============================================================================
//
// Multi-Version Timestamp Ordering bookkeeping:
// - every transaction is identified by its start timestamp
// - reads create commit dependencies on the version's writer (wait counts)
// - aborts cascade through the readers of erased versions
//
// ============================================================================

pub mod manager;
pub mod rollback;
pub mod state;

pub use manager::TransactionTable;
pub use rollback::{RollbackEngine, RollbackReport};
pub use state::{Transaction, TransactionInfo, TransactionState};
