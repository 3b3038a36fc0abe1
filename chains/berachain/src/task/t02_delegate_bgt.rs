use crate::contracts::{self, validator_name, BgtToken, VALIDATORS};
use crate::task::{BeraClient, Task, TaskContext, TaskResult};
use crate::utils::gas::{Fees, GasManager};
use crate::utils::tx::{calldata, hash_of, send_and_confirm};
use anyhow::{bail, Result};
use async_trait::async_trait;
use core_logic::WalletRecord;
use ethers::prelude::*;
use ethers::utils::format_ether;
use std::sync::Arc;
use tracing::{info, warn};

/// Queue all unboosted BGT on a validator, then activate every queued boost
/// whose delay has passed.
pub struct DelegateBgtTask {
    /// Index into the known validators. `None` picks one per wallet.
    validator: Option<usize>,
}

impl DelegateBgtTask {
    pub fn manual(validator: usize) -> Self {
        Self {
            validator: Some(validator),
        }
    }

    pub fn random() -> Self {
        Self { validator: None }
    }

    fn choose(&self, ctx: &TaskContext) -> usize {
        self.validator
            .unwrap_or_else(|| ctx.jitter.pick(VALIDATORS.len()))
            .min(VALIDATORS.len() - 1)
    }
}

#[async_trait]
impl Task<TaskContext> for DelegateBgtTask {
    fn name(&self) -> &str {
        "02_delegateBgt"
    }

    async fn run(&self, ctx: &TaskContext, wallet: &WalletRecord) -> Result<TaskResult> {
        let account = TaskContext::address_of(wallet)?;
        let bgt_addr = contracts::address(contracts::BGT)?;
        let client = ctx.signer(wallet)?;
        let bgt = BgtToken::new(bgt_addr, client.clone());
        let fees = Fees::fixed_gwei(GasManager::GWEI_BGT);

        let amount = bgt.unboosted_balance_of(account).call().await?;
        if amount.is_zero() {
            return Ok(TaskResult::skipped("no unboosted BGT"));
        }
        if amount > U256::from(u128::MAX) {
            bail!("unboosted balance {} does not fit uint128", amount);
        }

        let (name, validator) = VALIDATORS[self.choose(ctx)];
        let validator = contracts::address(validator)?;
        info!(
            "[WL{:03}] queueing {} BGT on {}",
            wallet.id,
            format_ether(amount),
            name
        );

        let call = bgt.queue_boost(validator, amount.as_u128());
        let tx = Eip1559TransactionRequest::new()
            .to(bgt_addr)
            .data(calldata(&call)?)
            .gas(GasManager::LIMIT_CONTRACT_CALL);
        let receipt = send_and_confirm(ctx, &client, fees.apply(tx), "queueBoost").await?;

        let activated = self.activate_ready(ctx, wallet, &client, bgt_addr, account).await;

        Ok(TaskResult::confirmed(
            format!(
                "queued {} BGT on {}, activated {} pending boosts",
                format_ether(amount),
                name,
                activated
            ),
            Some(hash_of(&receipt)),
        ))
    }
}

impl DelegateBgtTask {
    /// Activation failures are logged and do not fail the wallet.
    async fn activate_ready(
        &self,
        ctx: &TaskContext,
        wallet: &WalletRecord,
        client: &Arc<BeraClient>,
        bgt_addr: Address,
        account: Address,
    ) -> usize {
        let current_block = match ctx.provider.get_block_number().await {
            Ok(n) => n.as_u64(),
            Err(e) => {
                warn!("[WL{:03}] block number unavailable: {}", wallet.id, e);
                return 0;
            }
        };

        let pending = match ctx
            .subgraph
            .user_validator_infos(&ctx.config.subgraph_bgt_url, &format!("{:?}", account))
            .await
        {
            Ok(infos) => infos,
            Err(e) => {
                warn!("[WL{:03}] pending boosts unavailable: {:#}", wallet.id, e);
                return 0;
            }
        };

        let fees = Fees::fixed_gwei(GasManager::GWEI_BGT);
        let bgt = BgtToken::new(bgt_addr, client.clone());
        let mut activated = 0;

        for info in pending.iter().filter(|i| i.is_ready(current_block)) {
            let Ok(coinbase) = info.coinbase.parse::<Address>() else {
                warn!("[WL{:03}] bad coinbase {}", wallet.id, info.coinbase);
                continue;
            };
            let name = validator_name(coinbase);
            info!(
                "[WL{:03}] activating {:.3} BGT on {}",
                wallet.id,
                info.amount_queued(),
                name
            );

            let call = bgt.activate_boost(coinbase);
            let data = match calldata(&call) {
                Ok(d) => d,
                Err(e) => {
                    warn!("[WL{:03}] {:#}", wallet.id, e);
                    continue;
                }
            };
            let tx = Eip1559TransactionRequest::new()
                .to(bgt_addr)
                .data(data)
                .gas(GasManager::LIMIT_CONTRACT_CALL);

            match send_and_confirm(ctx, client, fees.apply(tx), "activateBoost").await {
                Ok(_) => activated += 1,
                Err(e) => warn!(
                    "[WL{:03}] activateBoost on {} failed: {:#}",
                    wallet.id, name, e
                ),
            }
            tokio::time::sleep(ctx.config.tx_pacing()).await;
        }

        activated
    }
}
