use anyhow::{Context, Result};
use config::{Config, Environment, File};
use core_logic::{ChainConfig, ConfigError, RetryPolicy, RunnerConfig};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct BeraConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub tx_explorer: String,
    #[serde(default)]
    pub wallets_path: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub inter_batch_delay_ms: u64,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
    #[serde(default = "default_tx_pacing_ms")]
    pub tx_pacing_ms: u64,
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    pub subgraph_bgt_url: String,
    pub subgraph_kodiak_url: String,
}

fn default_batch_size() -> usize {
    RunnerConfig::DEFAULT_BATCH_SIZE
}

fn default_tx_pacing_ms() -> u64 {
    500
}

fn default_step_delay_ms() -> u64 {
    5000
}

impl BeraConfig {
    /// TOML file first, then `BERA_*` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("BERA").try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read config {}", path))?;

        let config: BeraConfig = settings
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError {
                path: path.to_string(),
                msg: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chain().validate()?;
        self.runner(None).validate()?;

        for (field, url) in [
            ("subgraph_bgt_url", &self.subgraph_bgt_url),
            ("subgraph_kodiak_url", &self.subgraph_kodiak_url),
        ] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("'{}' is not an http(s) URL", url),
                });
            }
        }
        Ok(())
    }

    pub fn chain(&self) -> ChainConfig {
        ChainConfig {
            name: "bArtio".to_string(),
            rpc_endpoint: self.rpc_url.clone(),
            chain_id: self.chain_id,
            tx_explorer: self.tx_explorer.clone(),
        }
    }

    /// Runner settings, with an action-specific inter-batch delay if given.
    pub fn runner(&self, delay_ms: Option<u64>) -> RunnerConfig {
        RunnerConfig::new(self.batch_size, delay_ms.unwrap_or(self.inter_batch_delay_ms))
            .with_retry_policy(self.retry_policy)
    }

    pub fn tx_pacing(&self) -> Duration {
        Duration::from_millis(self.tx_pacing_ms)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}
