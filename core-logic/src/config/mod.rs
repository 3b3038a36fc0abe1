use crate::error::ConfigError;
use crate::utils::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pacing and retry settings for one batched run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "RunnerConfig::default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub inter_batch_delay_ms: u64,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
            inter_batch_delay_ms: 0,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl RunnerConfig {
    pub const DEFAULT_BATCH_SIZE: usize = 10;

    fn default_batch_size() -> usize {
        Self::DEFAULT_BATCH_SIZE
    }

    pub fn new(batch_size: usize, inter_batch_delay_ms: u64) -> Self {
        Self {
            batch_size,
            inter_batch_delay_ms,
            ..Default::default()
        }
    }

    pub fn with_delay_ms(mut self, inter_batch_delay_ms: u64) -> Self {
        self.inter_batch_delay_ms = inter_batch_delay_ms;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch_size".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        Ok(())
    }
}

/// Static description of the chain an action talks to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    pub rpc_endpoint: String,
    pub chain_id: u64,
    pub tx_explorer: String,
}

impl ChainConfig {
    /// Explorer link for a transaction hash.
    pub fn tx_link(&self, tx_hash: &str) -> String {
        format!("{}{}", self.tx_explorer, tx_hash)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rpc_endpoint.starts_with("http://") || self.rpc_endpoint.starts_with("https://"))
        {
            return Err(ConfigError::InvalidRpcUrl {
                url: self.rpc_endpoint.clone(),
            });
        }
        Ok(())
    }
}
