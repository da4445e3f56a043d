pub mod error;
pub mod types;

pub use error::{DbError, Result};
pub use types::{Key, TransactionId, Value, VersionRef};
