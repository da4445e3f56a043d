// ============================================================================
// Transaction Table
// ============================================================================

use super::{Transaction, TransactionInfo};
use crate::core::{DbError, Result, TransactionId};
use std::collections::HashMap;

/// Live transactions by timestamp, plus the timestamp counter.
///
/// Committed and aborted transactions are dropped from the table, so "present"
/// means "active".
pub struct TransactionTable {
    transactions: HashMap<TransactionId, Transaction>,
    next_ts: u64,
    max_active: Option<usize>,
}

impl Default for TransactionTable {
    fn default() -> Self {
        Self::new(1, None)
    }
}

impl TransactionTable {
    pub fn new(first_timestamp: u64, max_active: Option<usize>) -> Self {
        Self {
            transactions: HashMap::new(),
            next_ts: first_timestamp,
            max_active,
        }
    }

    /// Allocate the next timestamp and register a fresh transaction
    pub fn begin(&mut self) -> Result<TransactionId> {
        if let Some(limit) = self.max_active
            && self.transactions.len() >= limit
        {
            return Err(DbError::TooManyTransactions(limit));
        }

        let ts = self.next_ts;
        self.next_ts = ts.checked_add(1).ok_or(DbError::TimestampExhausted)?;

        let id = TransactionId(ts);
        self.transactions.insert(id, Transaction::new(id));
        Ok(id)
    }

    pub fn is_active(&self, id: TransactionId) -> bool {
        self.transactions.contains_key(&id)
    }

    pub fn get(&self, id: TransactionId) -> Result<&Transaction> {
        self.transactions
            .get(&id)
            .ok_or(DbError::NoSuchTransaction(id))
    }

    pub fn get_mut(&mut self, id: TransactionId) -> Result<&mut Transaction> {
        self.transactions
            .get_mut(&id)
            .ok_or(DbError::NoSuchTransaction(id))
    }

    /// Drop a transaction from the live set
    pub fn remove(&mut self, id: TransactionId) -> Option<Transaction> {
        self.transactions.remove(&id)
    }

    pub fn info(&self, id: TransactionId) -> Option<TransactionInfo> {
        self.transactions.get(&id).map(Transaction::info)
    }

    /// Active ids, oldest first
    pub fn active_ids(&self) -> Vec<TransactionId> {
        let mut ids: Vec<TransactionId> = self.transactions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Timestamp the next `begin` will hand out
    pub fn next_timestamp(&self) -> u64 {
        self.next_ts
    }
}
