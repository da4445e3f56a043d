// ============================================================================
// mvtokv Library
// ============================================================================
//
// Main-memory key-value store with Multi-Version Timestamp Ordering.
//
// ============================================================================

pub mod config;
pub mod core;
pub mod facade;
pub mod storage;
pub mod transaction;

// Re-export main types for convenience
pub use config::StoreConfig;
pub use self::core::{DbError, Key, Result, TransactionId, Value, VersionRef};
pub use facade::{CommitStatus, MvtoStore, StoreStats};
pub use storage::VersionInfo;
pub use transaction::{RollbackReport, TransactionInfo};

use std::sync::Arc;
use tokio::sync::Mutex;

// ============================================================================
// Shared async Client
// ============================================================================

/// Cloneable handle to one shared store
///
/// Every method locks the store for exactly one operation, so concurrent
/// tasks interleave at operation granularity, which is the granularity the
/// protocol is defined at.
///
/// # Examples
///
/// ```
/// use mvtokv::Client;
///
/// # #[tokio::main]
/// # async fn main() -> mvtokv::Result<()> {
/// let client = Client::new();
///
/// let t1 = client.begin().await?;
/// client.insert(t1, 1, 100).await?;
/// client.commit(t1).await?;
///
/// let t2 = client.begin().await?;
/// assert_eq!(client.read(t2, 1).await?, 100);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Client {
    store: Arc<Mutex<MvtoStore>>,
}

impl Client {
    /// Client over a fresh store with default configuration
    pub fn new() -> Self {
        Self::from_store(MvtoStore::new())
    }

    /// Client over a fresh store with custom configuration
    ///
    /// # Examples
    ///
    /// ```
    /// # use mvtokv::{Client, StoreConfig};
    /// # fn main() -> mvtokv::Result<()> {
    /// let config = StoreConfig::new("orders").max_active_transactions(16);
    /// let client = Client::with_config(config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        Ok(Self::from_store(MvtoStore::with_config(config)?))
    }

    pub fn from_store(store: MvtoStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub async fn begin(&self) -> Result<TransactionId> {
        self.store.lock().await.begin()
    }

    pub async fn insert(&self, txn: TransactionId, key: Key, value: Value) -> Result<()> {
        self.store.lock().await.insert(txn, key, value)
    }

    pub async fn read(&self, txn: TransactionId, key: Key) -> Result<Value> {
        self.store.lock().await.read(txn, key)
    }

    pub async fn write(&self, txn: TransactionId, key: Key, value: Value) -> Result<()> {
        self.store.lock().await.write(txn, key, value)
    }

    pub async fn commit(&self, txn: TransactionId) -> Result<CommitStatus> {
        self.store.lock().await.commit(txn)
    }

    pub async fn rollback(&self, txn: TransactionId) -> RollbackReport {
        self.store.lock().await.rollback(txn)
    }

    pub async fn is_active(&self, txn: TransactionId) -> bool {
        self.store.lock().await.is_active(txn)
    }

    pub async fn transaction_info(&self, txn: TransactionId) -> Option<TransactionInfo> {
        self.store.lock().await.transaction_info(txn)
    }

    pub async fn versions(&self, key: Key) -> Option<Vec<VersionInfo>> {
        self.store.lock().await.versions(key)
    }

    pub async fn stats(&self) -> StoreStats {
        self.store.lock().await.stats()
    }
}
