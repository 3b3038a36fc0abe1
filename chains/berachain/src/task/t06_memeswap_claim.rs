use crate::contracts::{self, MemeSwapVault};
use crate::task::{Task, TaskContext, TaskResult};
use crate::utils::gas::{Fees, GasManager};
use crate::utils::tx::{calldata, hash_of, send_and_confirm};
use anyhow::Result;
use async_trait::async_trait;
use core_logic::WalletRecord;
use ethers::prelude::*;
use ethers::utils::format_ether;

pub struct MemeSwapClaimTask;

#[async_trait]
impl Task<TaskContext> for MemeSwapClaimTask {
    fn name(&self) -> &str {
        "06_memeswapClaim"
    }

    async fn run(&self, ctx: &TaskContext, wallet: &WalletRecord) -> Result<TaskResult> {
        let account = TaskContext::address_of(wallet)?;
        let vault_addr = contracts::address(contracts::MEMESWAP_VAULT)?;

        let reader = MemeSwapVault::new(vault_addr, ctx.provider.clone());
        let earned = reader.earned(account).call().await?;
        if earned.is_zero() {
            return Ok(TaskResult::skipped("no rewards to claim"));
        }

        let client = ctx.signer(wallet)?;
        let vault = MemeSwapVault::new(vault_addr, client.clone());
        // The vault takes the earned amount as the round id.
        let call = vault.claim(earned, Address::zero());
        let tx = Eip1559TransactionRequest::new()
            .to(vault_addr)
            .data(calldata(&call)?)
            .gas(GasManager::LIMIT_MEMESWAP_CLAIM);

        let fees = Fees::fixed_gwei(GasManager::GWEI_BGT);
        let receipt = send_and_confirm(ctx, &client, fees.apply(tx), "claim").await?;
        Ok(TaskResult::confirmed(
            format!("claimed {} from the MemeSwap vault", format_ether(earned)),
            Some(hash_of(&receipt)),
        ))
    }
}
