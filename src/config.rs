//! Chain configuration

use crate::constants::*;
use crate::error::{ChainError, Result};
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// W: blocks at height `<= max_height - W` are pruned and can no longer
    /// be extended
    pub retention_window: Natural,
    /// Value of the single output of coinbases built by the block assembler
    pub coinbase_reward: Integer,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            retention_window: RETENTION_WINDOW,
            coinbase_reward: COINBASE_REWARD,
        }
    }
}

impl ChainConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ChainConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retention_window == 0 {
            return Err(ChainError::Config(
                "retention_window must be at least 1".to_string(),
            ));
        }
        if self.coinbase_reward < 0 {
            return Err(ChainError::Config(format!(
                "coinbase_reward must be non-negative, got {}",
                self.coinbase_reward
            )));
        }
        Ok(())
    }
}
