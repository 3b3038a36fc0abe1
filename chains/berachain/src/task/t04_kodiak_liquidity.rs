use crate::contracts::{self, Erc20Token, KodiakLpManager};
use crate::task::{Task, TaskContext, TaskResult};
use crate::utils::gas::GasManager;
use crate::utils::subgraph::KodiakVault;
use crate::utils::tx::{approve_if_needed, calldata, hash_of, send_and_confirm};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use core_logic::{FailureReason, WalletRecord};
use ethers::prelude::*;
use ethers::utils::{format_ether, format_units};
use tracing::warn;

pub const MIN_BERA_BALANCE: &str = "1";

const GAS_RESERVE: f64 = 0.99;
const HAIRCUT: u64 = 98;

/// Amounts for one `addLiquidityNative` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityPlan {
    /// YEET
    pub amount0_max: U256,
    /// BERA, also sent as value
    pub amount1_max: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub shares_min: U256,
}

/// Parse a decimal string into base units, truncating extra fraction digits.
pub fn parse_decimal(raw: &str, decimals: u32) -> Result<U256> {
    let raw = raw.trim();
    let (int, frac) = raw.split_once('.').unwrap_or((raw, ""));
    if int.starts_with('-') {
        bail!("negative amount {}", raw);
    }

    let mut frac: String = frac.chars().take(decimals as usize).collect();
    while frac.len() < decimals as usize {
        frac.push('0');
    }
    let digits = format!("{}{}", if int.is_empty() { "0" } else { int }, frac);
    U256::from_dec_str(&digits).with_context(|| format!("invalid decimal {}", raw))
}

fn less_slippage(amount: U256) -> U256 {
    amount * U256::from(HAIRCUT) / U256::from(100u64)
}

/// Size a deposit from the BERA balance and the island's reserves.
pub fn plan_liquidity(balance: U256, vault: &KodiakVault) -> Result<LiquidityPlan> {
    let dec0: u32 = vault.token0.decimals.parse().context("bad token0 decimals")?;
    let dec1: u32 = vault.token1.decimals.parse().context("bad token1 decimals")?;
    let price: f64 = vault.pool.token0_price.parse().context("bad token0Price")?;
    if price <= 0.0 {
        bail!("token0Price is {}", price);
    }

    let balance: f64 = format_ether(balance).parse()?;
    let contribute = balance * GAS_RESERVE * 0.98;
    if contribute <= 0.0 {
        bail!("nothing to contribute");
    }

    let amount1_max = parse_decimal(&format!("{:.18}", contribute), 18)?;
    let amount0 = contribute / price * 0.98;
    let amount0_max = parse_decimal(&format!("{:.*}", dec0 as usize, amount0), dec0)?;

    let unit0 = U256::exp10(dec0 as usize);
    let price_wei = parse_decimal(&format!("{:.18}", price), 18)?;
    let tvl0 = parse_decimal(&vault.pool.total_value_locked_token0, dec0)?;
    let tvl1 = parse_decimal(&vault.pool.total_value_locked_token1, dec1)?;
    let supply = parse_decimal(&vault.output_token_supply, 0)?;

    let total_value = less_slippage(tvl1 + tvl0 * price_wei / unit0);
    if total_value.is_zero() {
        bail!("island has no liquidity");
    }
    let contribution = less_slippage(amount1_max + amount0_max * price_wei / unit0);

    let one = U256::exp10(18);
    let share_ratio = contribution * one / total_value;
    let shares_min = less_slippage(supply * share_ratio / one);

    Ok(LiquidityPlan {
        amount0_max,
        amount1_max,
        amount0_min: less_slippage(amount0_max),
        amount1_min: less_slippage(amount1_max),
        shares_min,
    })
}

/// Add BERA plus YEET to the Kodiak YEET/BERA island.
pub struct KodiakLiquidityTask;

#[async_trait]
impl Task<TaskContext> for KodiakLiquidityTask {
    fn name(&self) -> &str {
        "04_kodiakLiquidity"
    }

    async fn run(&self, ctx: &TaskContext, wallet: &WalletRecord) -> Result<TaskResult> {
        let account = TaskContext::address_of(wallet)?;
        let lp_manager = contracts::address(contracts::KODIAK_LP_MANAGER)?;
        let island = contracts::address(contracts::KODIAK_ISLAND)?;
        let yeet_addr = contracts::address(contracts::YEET)?;

        let vault = match ctx
            .subgraph
            .kodiak_vault(&ctx.config.subgraph_kodiak_url, contracts::KODIAK_ISLAND)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                warn!("[WL{:03}] pool data fetch failed: {:#}", wallet.id, e);
                return Ok(TaskResult::failed(
                    FailureReason::Precondition("POOL_DATA_UNAVAILABLE"),
                    format!("{:#}", e),
                ));
            }
        };

        let balance = ctx.provider.get_balance(account, None).await?;
        let plan = plan_liquidity(balance, &vault)?;

        let client = ctx.signer(wallet)?;
        let yeet = Erc20Token::new(yeet_addr, client.clone());
        let yeet_balance = yeet.balance_of(account).call().await?;
        if yeet_balance < plan.amount0_max {
            let dec0: u32 = vault.token0.decimals.parse().unwrap_or(18);
            return Ok(TaskResult::failed(
                FailureReason::Precondition("INSUFFICIENT_YEET_BALANCE"),
                format!(
                    "need {} YEET, have {}",
                    format_units(plan.amount0_max, dec0).unwrap_or_default(),
                    format_units(yeet_balance, dec0).unwrap_or_default()
                ),
            ));
        }

        approve_if_needed(ctx, &client, yeet_addr, lp_manager, None).await?;

        let manager = KodiakLpManager::new(lp_manager, client.clone());
        let call = manager.add_liquidity_native(
            island,
            plan.amount0_max,
            plan.amount1_max,
            plan.amount0_min,
            plan.amount1_min,
            plan.shares_min,
            account,
        );
        let tx = Eip1559TransactionRequest::new()
            .to(lp_manager)
            .data(calldata(&call)?)
            .value(plan.amount1_max)
            .gas(GasManager::LIMIT_CONTRACT_CALL);

        let receipt = send_and_confirm(ctx, &client, tx, "addLiquidityNative").await?;
        Ok(TaskResult::confirmed(
            format!("added {} BERA of liquidity", format_ether(plan.amount1_max)),
            Some(hash_of(&receipt)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::subgraph::{TokenDecimals, VaultPool};
    use ethers::utils::parse_ether;

    fn vault() -> KodiakVault {
        KodiakVault {
            id: contracts::KODIAK_ISLAND.to_lowercase(),
            output_token_supply: "1000000000000000000000".to_string(),
            token0: TokenDecimals {
                decimals: "18".to_string(),
            },
            token1: TokenDecimals {
                decimals: "18".to_string(),
            },
            pool: VaultPool {
                token0_price: "0.5".to_string(),
                total_value_locked_token0: "100".to_string(),
                total_value_locked_token1: "50".to_string(),
            },
        }
    }

    fn as_f64(v: U256) -> f64 {
        format_ether(v).parse().unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= b.abs() * 1e-9
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1.5", 18).unwrap(), parse_ether("1.5").unwrap());
        assert_eq!(parse_decimal("12", 2).unwrap(), U256::from(1200u64));
        assert_eq!(parse_decimal("0.123456", 3).unwrap(), U256::from(123u64));
        assert_eq!(parse_decimal(".5", 1).unwrap(), U256::from(5u64));
        assert!(parse_decimal("-1", 18).is_err());
        assert!(parse_decimal("abc", 18).is_err());
    }

    #[test]
    fn test_liquidity_plan() {
        let plan = plan_liquidity(parse_ether("10").unwrap(), &vault()).unwrap();

        assert!(close(as_f64(plan.amount1_max), 9.702));
        assert!(close(as_f64(plan.amount0_max), 9.702 / 0.5 * 0.98));
        assert!(close(as_f64(plan.amount0_min), as_f64(plan.amount0_max) * 0.98));
        assert!(close(as_f64(plan.amount1_min), as_f64(plan.amount1_max) * 0.98));

        // (a1 + a0 * p) * 0.98 / ((tvl1 + tvl0 * p) * 0.98) * supply * 0.98
        let expected_shares = 9.702 * 1.98 * 0.98 / 98.0 * 1000.0 * 0.98;
        assert!((as_f64(plan.shares_min) - expected_shares).abs() < 1e-6);
    }

    #[test]
    fn test_liquidity_plan_rejects_empty_pool() {
        let mut v = vault();
        v.pool.total_value_locked_token0 = "0".to_string();
        v.pool.total_value_locked_token1 = "0".to_string();
        assert!(plan_liquidity(parse_ether("10").unwrap(), &v).is_err());

        let mut v = vault();
        v.pool.token0_price = "0".to_string();
        assert!(plan_liquidity(parse_ether("10").unwrap(), &v).is_err());
    }
}
