use crate::contracts::{self, MemeSwapVault};
use crate::task::{Task, TaskContext, TaskResult};
use crate::utils::gas::{Fees, GasManager};
use crate::utils::tx::{calldata, hash_of, send_and_confirm};
use anyhow::Result;
use async_trait::async_trait;
use core_logic::{round2, WalletRecord};
use ethers::prelude::*;
use ethers::utils::{format_ether, parse_ether};
use tracing::info;

pub const STAKE_PERCENT_RANGE: (f64, f64) = (15.0, 30.0);
pub const GAS_LIMIT_RANGE: (u64, u64) = (150_000, 250_000);
pub const INTER_BATCH_DELAY_MS: u64 = 5000;

/// BERA to stake for a two-decimal `percent` of `balance`, rounded to cents.
pub fn stake_amount(balance: f64, percent: f64) -> f64 {
    round2(round2(percent) / 100.0 * balance)
}

pub struct MemeSwapDepositTask;

#[async_trait]
impl Task<TaskContext> for MemeSwapDepositTask {
    fn name(&self) -> &str {
        "05_memeswapDeposit"
    }

    async fn run(&self, ctx: &TaskContext, wallet: &WalletRecord) -> Result<TaskResult> {
        let vault_addr = contracts::address(contracts::MEMESWAP_VAULT)?;

        let balance: f64 = format_ether(ctx.balance_of(wallet).await?).parse()?;
        let percent = ctx
            .jitter
            .range_f64(STAKE_PERCENT_RANGE.0, STAKE_PERCENT_RANGE.1);
        let amount = stake_amount(balance, percent);
        if amount <= 0.0 {
            return Ok(TaskResult::skipped("balance too low to stake"));
        }

        info!("[WL{:03}] staking {:.2} BERA", wallet.id, amount);

        let client = ctx.signer(wallet)?;
        let vault = MemeSwapVault::new(vault_addr, client.clone());
        let call = vault.stake(Address::zero());
        let gas = ctx.jitter.range_u64(GAS_LIMIT_RANGE.0..=GAS_LIMIT_RANGE.1);
        let tx = Eip1559TransactionRequest::new()
            .to(vault_addr)
            .data(calldata(&call)?)
            .value(parse_ether(format!("{:.2}", amount))?)
            .gas(gas);

        let fees = Fees::fixed_gwei(GasManager::GWEI_BGT);
        let receipt = send_and_confirm(ctx, &client, fees.apply(tx), "stake").await?;
        Ok(TaskResult::confirmed(
            format!("staked {:.2} BERA in the MemeSwap vault", amount),
            Some(hash_of(&receipt)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stake_amount() {
        assert_eq!(stake_amount(10.0, 20.0), 2.0);
        assert_eq!(stake_amount(3.33, 15.0), 0.5);
        assert_eq!(stake_amount(0.02, 15.0), 0.0);
    }
}
