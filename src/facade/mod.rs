pub mod stats;
pub mod store;

pub use stats::StoreStats;
pub use store::{CommitStatus, MvtoStore};
