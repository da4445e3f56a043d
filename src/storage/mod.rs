pub mod chain;
pub mod memory;
pub mod version;

pub use chain::VersionChain;
pub use memory::VersionStore;
pub use version::{Version, VersionInfo};
