use crate::contracts::{self, WagmiStake, WagmiToken};
use crate::task::{BeraClient, Task, TaskContext, TaskResult};
use crate::utils::gas::GasManager;
use crate::utils::tx::{calldata, hash_of, send_and_confirm};
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{FailureReason, WalletRecord};
use ethers::prelude::*;
use ethers::utils::format_ether;
use std::time::Duration;
use tracing::{info, warn};

pub const GAS_LIMIT_RANGE: (u64, u64) = (150_000, 250_000);
pub const REPEAT_HOURS_RANGE: (u64, u64) = (9, 12);

/// Pause before the next repeat-mode round.
pub fn repeat_interval(hours: u64) -> Duration {
    Duration::from_secs(hours * 3600)
}

/// Faucet, approve, then stake the whole WAGMI balance.
pub struct WagmiStakeTask;

impl WagmiStakeTask {
    async fn send_step(
        &self,
        ctx: &TaskContext,
        client: &BeraClient,
        to: Address,
        data: Bytes,
        label: &str,
    ) -> Result<TransactionReceipt> {
        let fees = ctx.gas.scaled_fees(GasManager::WAGMI_FEE_PERCENT).await?;
        let gas = ctx.jitter.range_u64(GAS_LIMIT_RANGE.0..=GAS_LIMIT_RANGE.1);
        let tx = Eip1559TransactionRequest::new().to(to).data(data).gas(gas);
        send_and_confirm(ctx, client, fees.apply(tx), label).await
    }
}

#[async_trait]
impl Task<TaskContext> for WagmiStakeTask {
    fn name(&self) -> &str {
        "10_wagmiStake"
    }

    async fn run(&self, ctx: &TaskContext, wallet: &WalletRecord) -> Result<TaskResult> {
        let account = TaskContext::address_of(wallet)?;
        let token_addr = contracts::address(contracts::WAGMI_TOKEN)?;
        let stake_addr = contracts::address(contracts::WAGMI_STAKE)?;

        let client = ctx.signer(wallet)?;
        let token = WagmiToken::new(token_addr, client.clone());
        let stake = WagmiStake::new(stake_addr, client.clone());

        let faucet = calldata(&token.faucet(account))?;
        let approve = calldata(&token.approve(stake_addr, U256::MAX))?;

        for (step, (label, data)) in [("faucet", faucet), ("approve", approve)]
            .into_iter()
            .enumerate()
        {
            info!("[WL{:03}] step {}: {}", wallet.id, step + 1, label);
            if let Err(e) = self.send_step(ctx, &client, token_addr, data, label).await {
                warn!("[WL{:03}] {} failed: {:#}", wallet.id, label, e);
                return Ok(TaskResult::failed(
                    FailureReason::classify(&e),
                    format!("step {} ({}) failed: {:#}", step + 1, label, e),
                ));
            }
            tokio::time::sleep(ctx.config.step_delay()).await;
        }

        info!("[WL{:03}] step 3: stake", wallet.id);
        let balance = token
            .balance_of(account)
            .call()
            .await
            .context("WAGMI balanceOf failed")?;
        let data = calldata(&stake.stake(balance))?;
        match self.send_step(ctx, &client, stake_addr, data, "stake").await {
            Ok(receipt) => Ok(TaskResult::confirmed(
                format!("staked {} WAGMI", format_ether(balance)),
                Some(hash_of(&receipt)),
            )),
            Err(e) => Ok(TaskResult::failed(
                FailureReason::classify(&e),
                format!("step 3 (stake) failed: {:#}", e),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_interval() {
        assert_eq!(repeat_interval(9), Duration::from_secs(32_400));
        assert_eq!(repeat_interval(12), Duration::from_secs(43_200));
    }
}
