use anyhow::{Context, Result};
use ethers::prelude::*;
use std::sync::Arc;

/// EIP-1559 fee pair applied to a transaction request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fees {
    pub max_fee: U256,
    pub priority_fee: U256,
}

impl Fees {
    /// Same value for both fields, in gwei.
    pub fn fixed_gwei(gwei: u64) -> Self {
        let wei = gwei_to_wei(gwei);
        Self {
            max_fee: wei,
            priority_fee: wei,
        }
    }

    pub fn apply(&self, tx: Eip1559TransactionRequest) -> Eip1559TransactionRequest {
        tx.max_fee_per_gas(self.max_fee)
            .max_priority_fee_per_gas(self.priority_fee)
    }
}

pub fn gwei_to_wei(gwei: u64) -> U256 {
    U256::from(gwei) * U256::exp10(9)
}

/// `base_fee * percent / 100`.
pub fn scale_fee(base_fee: U256, percent: u64) -> U256 {
    base_fee * U256::from(percent) / U256::from(100u64)
}

#[derive(Clone, Debug)]
pub struct GasManager {
    provider: Arc<Provider<Http>>,
}

impl GasManager {
    pub const LIMIT_CONTRACT_CALL: u64 = 2_000_000;
    pub const LIMIT_MEMESWAP_CLAIM: u64 = 250_000;
    pub const GWEI_BGT: u64 = 10;
    pub const GWEI_TESTNET_FREE: u64 = 1;
    pub const BEX_FEE_PERCENT: u64 = 130;
    pub const WAGMI_FEE_PERCENT: u64 = 125;

    pub fn new(provider: Arc<Provider<Http>>) -> Self {
        Self { provider }
    }

    pub async fn base_fee(&self) -> Result<U256> {
        let block = self
            .provider
            .get_block(BlockNumber::Latest)
            .await?
            .context("Failed to get latest block")?;

        block
            .base_fee_per_gas
            .context("Base fee missing in block")
    }

    /// Both fee fields set to the latest base fee times `percent / 100`.
    pub async fn scaled_fees(&self, percent: u64) -> Result<Fees> {
        let fee = scale_fee(self.base_fee().await?, percent);
        Ok(Fees {
            max_fee: fee,
            priority_fee: fee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_gwei() {
        let fees = Fees::fixed_gwei(10);
        assert_eq!(fees.max_fee, U256::from(10_000_000_000u64));
        assert_eq!(fees.priority_fee, fees.max_fee);
    }

    #[test]
    fn test_scale_fee() {
        let base = U256::from(1_000_000_007u64);
        assert_eq!(scale_fee(base, 130), U256::from(1_300_000_009u64));
        assert_eq!(scale_fee(base, 125), U256::from(1_250_000_008u64));
    }

    #[test]
    fn test_apply_sets_both_fields() {
        let tx = Fees::fixed_gwei(1).apply(Eip1559TransactionRequest::new());
        assert_eq!(tx.max_fee_per_gas, Some(gwei_to_wei(1)));
        assert_eq!(tx.max_priority_fee_per_gas, Some(gwei_to_wei(1)));
    }
}
