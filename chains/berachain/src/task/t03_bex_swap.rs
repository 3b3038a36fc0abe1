use crate::contracts::{self, BexRouter, SwapStep, WrappedBera, BEX_POOL_IDX};
use crate::task::{BeraClient, Task, TaskContext, TaskResult};
use crate::utils::gas::{Fees, GasManager};
use crate::utils::tx::{approve_if_needed, calldata, hash_of, send_and_confirm};
use anyhow::{bail, Result};
use async_trait::async_trait;
use core_logic::{round2, FailureReason, WalletRecord};
use ethers::prelude::*;
use ethers::utils::{format_ether, parse_ether};
use tracing::{info, warn};

pub const MIN_BERA_BALANCE: &str = "0.01";
pub const MIN_WBERA_BALANCE: &str = "0.01";
pub const WRAP_PERCENT_RANGE: (f64, f64) = (40.0, 45.0);

/// Percentage with two decimals, as basis points.
pub fn percent_to_bps(percent: f64) -> u64 {
    (round2(percent) * 100.0).round() as u64
}

pub fn portion_of(balance: U256, bps: u64) -> U256 {
    balance * U256::from(bps) / U256::from(10_000u64)
}

/// Wrap part of the BERA balance and swap the WBERA for YEET on BEX.
pub struct BexSwapTask;

#[async_trait]
impl Task<TaskContext> for BexSwapTask {
    fn name(&self) -> &str {
        "03_bexSwap"
    }

    async fn run(&self, ctx: &TaskContext, wallet: &WalletRecord) -> Result<TaskResult> {
        let account = TaskContext::address_of(wallet)?;
        let router = contracts::address(contracts::BEX_ROUTER)?;
        let wbera_addr = contracts::address(contracts::WBERA)?;
        let yeet_addr = contracts::address(contracts::YEET)?;
        let client = ctx.signer(wallet)?;

        let fees = ctx.gas.scaled_fees(GasManager::BEX_FEE_PERCENT).await?;

        approve_if_needed(ctx, &client, yeet_addr, router, Some(fees)).await?;
        approve_if_needed(ctx, &client, wbera_addr, router, Some(fees)).await?;

        let wbera = WrappedBera::new(wbera_addr, client.clone());
        if let Err(e) = self.wrap(ctx, &client, &wbera, wbera_addr, account, fees).await {
            warn!("[WL{:03}] wrap failed: {:#}", wallet.id, e);
            return Ok(TaskResult::failed(
                FailureReason::Precondition("CONVERSION_FAILED"),
                format!("BERA to WBERA conversion failed: {:#}", e),
            ));
        }

        let wbera_balance = wbera.balance_of(account).call().await?;
        if wbera_balance < parse_ether(MIN_WBERA_BALANCE)? {
            return Ok(TaskResult::failed(
                FailureReason::Precondition("INSUFFICIENT_WBERA_BALANCE"),
                format!("only {} WBERA after wrapping", format_ether(wbera_balance)),
            ));
        }
        if wbera_balance > U256::from(u128::MAX) {
            bail!("WBERA balance {} does not fit uint128", wbera_balance);
        }

        let steps = vec![SwapStep {
            pool_idx: U256::from(BEX_POOL_IDX),
            base: yeet_addr,
            quote: wbera_addr,
            is_buy: false,
        }];
        let bex = BexRouter::new(router, client.clone());
        let call = bex.multi_swap(steps, wbera_balance.as_u128(), 1);
        let tx = Eip1559TransactionRequest::new()
            .to(router)
            .data(calldata(&call)?)
            .gas(GasManager::LIMIT_CONTRACT_CALL);

        let receipt = send_and_confirm(ctx, &client, fees.apply(tx), "multiSwap").await?;
        Ok(TaskResult::confirmed(
            format!("swapped {} WBERA for YEET", format_ether(wbera_balance)),
            Some(hash_of(&receipt)),
        ))
    }
}

impl BexSwapTask {
    async fn wrap(
        &self,
        ctx: &TaskContext,
        client: &BeraClient,
        wbera: &WrappedBera<BeraClient>,
        wbera_addr: Address,
        account: Address,
        fees: Fees,
    ) -> Result<()> {
        let balance = ctx.provider.get_balance(account, None).await?;
        let percent = ctx
            .jitter
            .range_f64(WRAP_PERCENT_RANGE.0, WRAP_PERCENT_RANGE.1);
        let amount = portion_of(balance, percent_to_bps(percent));
        info!(
            "wrapping {:.2}% of balance: {} BERA",
            round2(percent),
            format_ether(amount)
        );

        let call = wbera.deposit();
        let tx = Eip1559TransactionRequest::new()
            .to(wbera_addr)
            .data(calldata(&call)?)
            .value(amount)
            .gas(GasManager::LIMIT_CONTRACT_CALL);

        send_and_confirm(ctx, client, fees.apply(tx), "deposit").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_to_bps() {
        assert_eq!(percent_to_bps(40.0), 4000);
        assert_eq!(percent_to_bps(42.3456), 4235);
        assert_eq!(percent_to_bps(44.999), 4500);
    }

    #[test]
    fn test_portion_of_balance() {
        let balance = parse_ether("2").unwrap();
        assert_eq!(portion_of(balance, 4250), parse_ether("0.85").unwrap());
        assert_eq!(portion_of(U256::zero(), 4500), U256::zero());
    }
}
