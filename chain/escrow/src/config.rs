//! Ledger construction parameters

use escrow_types::ids::Address;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Configuration for a new ledger.
///
/// `void_delay_seconds` is fixed for the life of the ledger. The operator can
/// later be replaced by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Initial owner
    pub owner: Address,
    /// Initial operator
    pub operator: Address,
    /// Seconds after creation before a pending commitment may be voided
    pub void_delay_seconds: i64,
}

impl LedgerConfig {
    pub fn new(owner: Address, operator: Address, void_delay_seconds: i64) -> Self {
        Self {
            owner,
            operator,
            void_delay_seconds,
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.void_delay_seconds < 0 {
            return Err(ConfigError::NegativeVoidDelay(self.void_delay_seconds));
        }
        Ok(())
    }
}
