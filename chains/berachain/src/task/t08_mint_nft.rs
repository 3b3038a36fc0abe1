use crate::contracts::{self, TestnetFreeEdition};
use crate::task::{Task, TaskContext, TaskResult};
use crate::utils::gas::{Fees, GasManager};
use crate::utils::tx::{calldata, hash_of, send_and_confirm};
use anyhow::Result;
use async_trait::async_trait;
use core_logic::WalletRecord;
use ethers::prelude::*;
use ethers::utils::{format_ether, parse_ether};

pub const MINT_PRICE: &str = "0.010001";
pub const MIN_BALANCE: &str = "0.012";
pub const GAS_LIMIT_RANGE: (u64, u64) = (100_000, 180_000);
pub const INTER_BATCH_DELAY_MS: u64 = 1000;

/// Mint one Testnet.Free edition token.
pub struct MintNftTask;

#[async_trait]
impl Task<TaskContext> for MintNftTask {
    fn name(&self) -> &str {
        "08_mintNft"
    }

    async fn run(&self, ctx: &TaskContext, wallet: &WalletRecord) -> Result<TaskResult> {
        let balance = ctx.balance_of(wallet).await?;
        if balance < parse_ether(MIN_BALANCE)? {
            return Ok(TaskResult::skipped(format!(
                "balance {} BERA below {}",
                format_ether(balance),
                MIN_BALANCE
            )));
        }

        let edition_addr = contracts::address(contracts::TESTNET_FREE_MINT)?;
        let client = ctx.signer(wallet)?;
        let edition = TestnetFreeEdition::new(edition_addr, client.clone());
        let call = edition.purchase(U256::one());
        let gas = ctx.jitter.range_u64(GAS_LIMIT_RANGE.0..=GAS_LIMIT_RANGE.1);
        let tx = Eip1559TransactionRequest::new()
            .to(edition_addr)
            .data(calldata(&call)?)
            .value(parse_ether(MINT_PRICE)?)
            .gas(gas);

        let fees = Fees::fixed_gwei(GasManager::GWEI_TESTNET_FREE);
        let receipt = send_and_confirm(ctx, &client, fees.apply(tx), "purchase").await?;
        Ok(TaskResult::confirmed("minted 1 NFT", Some(hash_of(&receipt))))
    }
}
