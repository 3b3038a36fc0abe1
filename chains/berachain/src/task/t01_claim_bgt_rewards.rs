use crate::contracts::{self, RewardVault, REWARD_POOLS};
use crate::task::{Task, TaskContext, TaskResult};
use crate::utils::gas::{Fees, GasManager};
use crate::utils::tx::{calldata, hash_of, send_and_confirm};
use anyhow::Result;
use async_trait::async_trait;
use core_logic::{FailureReason, WalletRecord};
use ethers::prelude::*;
use ethers::utils::format_ether;
use futures::future::join_all;
use tracing::{info, warn};

/// 0.005 BGT.
pub const MIN_CLAIMABLE_WEI: u64 = 5_000_000_000_000_000;

pub fn is_claimable(earned: U256) -> bool {
    earned >= U256::from(MIN_CLAIMABLE_WEI)
}

pub struct ClaimBgtRewardsTask;

#[async_trait]
impl Task<TaskContext> for ClaimBgtRewardsTask {
    fn name(&self) -> &str {
        "01_claimBgtRewards"
    }

    async fn run(&self, ctx: &TaskContext, wallet: &WalletRecord) -> Result<TaskResult> {
        let account = TaskContext::address_of(wallet)?;

        let pools = REWARD_POOLS
            .iter()
            .map(|(name, addr)| Ok((*name, contracts::address(addr)?)))
            .collect::<Result<Vec<_>>>()?;

        let earned = join_all(pools.iter().map(|(_, pool)| {
            let vault = RewardVault::new(*pool, ctx.provider.clone());
            async move { vault.earned(account).call().await }
        }))
        .await;

        let mut eligible = Vec::new();
        let mut total = U256::zero();
        for ((name, pool), amount) in pools.into_iter().zip(earned) {
            match amount {
                Ok(a) if is_claimable(a) => {
                    total += a;
                    eligible.push((name, pool));
                }
                Ok(_) => {}
                Err(e) => warn!("[WL{:03}] earned() on {} failed: {}", wallet.id, name, e),
            }
        }

        if eligible.is_empty() {
            return Ok(TaskResult::skipped("no eligible rewards"));
        }
        info!(
            "[WL{:03}] {} BGT claimable across {} pools",
            wallet.id,
            format_ether(total),
            eligible.len()
        );

        let client = ctx.signer(wallet)?;
        let fees = Fees::fixed_gwei(GasManager::GWEI_BGT);
        let mut first_failure: Option<anyhow::Error> = None;
        let mut last_hash = None;

        for (name, pool) in &eligible {
            let vault = RewardVault::new(*pool, client.clone());
            let call = vault.get_reward(account);
            let tx = Eip1559TransactionRequest::new()
                .to(*pool)
                .data(calldata(&call)?)
                .gas(GasManager::LIMIT_CONTRACT_CALL);

            let label = format!("getReward {}", name);
            match send_and_confirm(ctx, &client, fees.apply(tx), &label).await {
                Ok(receipt) => last_hash = Some(hash_of(&receipt)),
                Err(e) => {
                    warn!("[WL{:03}] claim on {} failed: {:#}", wallet.id, name, e);
                    first_failure.get_or_insert(e);
                }
            }
            tokio::time::sleep(ctx.config.tx_pacing()).await;
        }

        match first_failure {
            Some(e) => Ok(TaskResult::failed(
                FailureReason::classify(&e),
                format!("{:#}", e),
            )),
            None => Ok(TaskResult::confirmed(
                format!("claimed {} BGT from {} pools", format_ether(total), eligible.len()),
                last_hash,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::utils::parse_ether;

    #[test]
    fn test_reward_threshold() {
        assert!(is_claimable(parse_ether("0.005").unwrap()));
        assert!(is_claimable(parse_ether("1").unwrap()));
        assert!(!is_claimable(parse_ether("0.0049").unwrap()));
        assert!(!is_claimable(U256::zero()));
    }
}
