use crate::core::{DbError, Result};
use serde::Deserialize;

/// Store configuration
///
/// Built with chained setters or loaded from JSON:
///
/// ```
/// use mvtokv::StoreConfig;
///
/// let config = StoreConfig::new("inventory")
///     .first_timestamp(10)
///     .max_active_transactions(64);
/// assert!(config.validate().is_ok());
///
/// let loaded = StoreConfig::from_json(r#"{ "name": "inventory" }"#).unwrap();
/// assert_eq!(loaded.first_timestamp, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Store name, attached to log events
    pub name: String,

    /// Timestamp handed to the first transaction. Must be at least 1:
    /// 0 is the read timestamp of a never-read version.
    pub first_timestamp: u64,

    /// Upper bound on concurrently active transactions
    pub max_active_transactions: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "mvtokv".to_string(),
            first_timestamp: 1,
            max_active_transactions: None,
        }
    }
}

impl StoreConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn first_timestamp(mut self, ts: u64) -> Self {
        self.first_timestamp = ts;
        self
    }

    pub fn max_active_transactions(mut self, max: usize) -> Self {
        self.max_active_transactions = Some(max);
        self
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: StoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_timestamp == 0 {
            return Err(DbError::ConfigError(
                "first_timestamp must be at least 1".into(),
            ));
        }
        if self.max_active_transactions == Some(0) {
            return Err(DbError::ConfigError(
                "max_active_transactions must be positive".into(),
            ));
        }
        Ok(())
    }
}
