use super::{Key, TransactionId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("Transaction {0} is not active")]
    NoSuchTransaction(TransactionId),

    #[error("Key {0} not found")]
    NoSuchKey(Key),

    #[error("Key {0} already exists")]
    DuplicateKey(Key),

    #[error("Write by {txn} on key {key} is too late: version already read at ts {read_ts}")]
    WriteTooLate {
        txn: TransactionId,
        key: Key,
        read_ts: u64,
    },

    #[error("Too many active transactions (limit {0})")]
    TooManyTransactions(usize),

    #[error("Transaction timestamps exhausted")]
    TimestampExhausted,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DbError {
    /// True when the failing transaction was rolled back before the error
    /// was returned.
    pub fn is_abort(&self) -> bool {
        matches!(self, DbError::DuplicateKey(_) | DbError::WriteTooLate { .. })
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}
