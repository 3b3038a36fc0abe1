use crate::contracts::{self, BeraSwapRouter, NATIVE_SYMBOL, SWAP_TOKENS};
use crate::task::{Task, TaskContext, TaskResult};
use crate::utils::gas::Fees;
use crate::utils::tx::{approve_if_needed, calldata, hash_of, send_and_confirm};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use core_logic::WalletRecord;
use ethers::prelude::*;
use ethers::utils::format_ether;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const GAS_LIMIT: u64 = 1_000_000;
pub const GWEI: u64 = 15;
pub const DEADLINE: Duration = Duration::from_secs(20 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapKind {
    NativeForTokens,
    TokensForNative,
    TokensForTokens,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRoute {
    pub kind: SwapKind,
    pub path: Vec<Address>,
}

impl SwapRoute {
    /// Token the router pulls from the wallet, if any.
    pub fn spent_token(&self) -> Option<Address> {
        match self.kind {
            SwapKind::NativeForTokens => None,
            _ => self.path.first().copied(),
        }
    }
}

/// Every symbol the swap prompt offers, native coin first.
pub fn swap_symbols() -> Vec<&'static str> {
    std::iter::once(NATIVE_SYMBOL)
        .chain(SWAP_TOKENS.iter().map(|(symbol, _)| *symbol))
        .collect()
}

fn token_address(symbol: &str) -> Result<Address> {
    let raw = SWAP_TOKENS
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
        .map(|(_, a)| *a)
        .with_context(|| format!("Token {} is not in the swap list", symbol))?;
    contracts::address(raw)
}

/// Router path between two symbols. The native coin travels as WBERA.
pub fn plan_route(from: &str, to: &str) -> Result<SwapRoute> {
    let from_native = from.eq_ignore_ascii_case(NATIVE_SYMBOL);
    let to_native = to.eq_ignore_ascii_case(NATIVE_SYMBOL);
    if from.eq_ignore_ascii_case(to) {
        bail!("Cannot swap {} for itself", from);
    }

    let wbera = contracts::address(contracts::WBERA)?;
    let (kind, path) = match (from_native, to_native) {
        (true, _) => (SwapKind::NativeForTokens, vec![wbera, token_address(to)?]),
        (_, true) => (SwapKind::TokensForNative, vec![token_address(from)?, wbera]),
        _ => (
            SwapKind::TokensForTokens,
            vec![token_address(from)?, token_address(to)?],
        ),
    };
    if path[0] == path[1] {
        bail!("{} and {} route through the same token", from, to);
    }
    Ok(SwapRoute { kind, path })
}

fn deadline() -> Result<U256> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock before epoch")?;
    Ok(U256::from((now + DEADLINE).as_secs()))
}

/// Swap an exact input amount through the BeraSwap router for one wallet.
pub struct RouterSwapTask {
    from: String,
    to: String,
    amount_in: U256,
}

impl RouterSwapTask {
    pub fn new(from: &str, to: &str, amount_in: U256) -> Self {
        Self {
            from: from.to_uppercase(),
            to: to.to_uppercase(),
            amount_in,
        }
    }
}

#[async_trait]
impl Task<TaskContext> for RouterSwapTask {
    fn name(&self) -> &str {
        "11_routerSwap"
    }

    async fn run(&self, ctx: &TaskContext, wallet: &WalletRecord) -> Result<TaskResult> {
        let route = plan_route(&self.from, &self.to)?;
        let account = TaskContext::address_of(wallet)?;
        let router_addr = contracts::address(contracts::BERASWAP_ROUTER)?;
        let client = ctx.signer(wallet)?;
        let fees = Fees::fixed_gwei(GWEI);

        if let Some(token) = route.spent_token() {
            approve_if_needed(ctx, &client, token, router_addr, Some(fees)).await?;
        }

        let router = BeraSwapRouter::new(router_addr, client.clone());
        let min_out = U256::one();
        let deadline = deadline()?;
        let path = route.path.clone();

        let amount = self.amount_in;
        let call = match route.kind {
            SwapKind::NativeForTokens => {
                router.swap_exact_eth_for_tokens(min_out, path, account, deadline)
            }
            SwapKind::TokensForNative => {
                router.swap_exact_tokens_for_eth(amount, min_out, path, account, deadline)
            }
            SwapKind::TokensForTokens => {
                router.swap_exact_tokens_for_tokens(amount, min_out, path, account, deadline)
            }
        };
        let mut tx = Eip1559TransactionRequest::new()
            .to(router_addr)
            .data(calldata(&call)?)
            .gas(GAS_LIMIT);
        if route.kind == SwapKind::NativeForTokens {
            tx = tx.value(amount);
        }

        let label = format!("swap {} {} -> {}", format_ether(amount), self.from, self.to);
        let receipt = send_and_confirm(ctx, &client, fees.apply(tx), &label).await?;
        Ok(TaskResult::confirmed(label, Some(hash_of(&receipt))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_in_routes_through_wbera() {
        let route = plan_route("bera", "YEET").unwrap();
        assert_eq!(route.kind, SwapKind::NativeForTokens);
        assert_eq!(route.path[0], contracts::address(contracts::WBERA).unwrap());
        assert_eq!(route.path[1], contracts::address(contracts::YEET).unwrap());
        assert_eq!(route.spent_token(), None);
    }

    #[test]
    fn test_native_out_spends_input_token() {
        let route = plan_route("HONEY", "BERA").unwrap();
        assert_eq!(route.kind, SwapKind::TokensForNative);
        assert_eq!(route.spent_token(), Some(route.path[0]));
        assert_eq!(route.path[1], contracts::address(contracts::WBERA).unwrap());
    }

    #[test]
    fn test_token_to_token() {
        let route = plan_route("USDC", "HONEY").unwrap();
        assert_eq!(route.kind, SwapKind::TokensForTokens);
        assert_eq!(route.path.len(), 2);
    }

    #[test]
    fn test_rejected_routes() {
        assert!(plan_route("BERA", "BERA").is_err());
        assert!(plan_route("BERA", "WBERA").is_err());
        assert!(plan_route("YEET", "DOGE").is_err());
    }

    #[test]
    fn test_symbols_start_with_native() {
        let symbols = swap_symbols();
        assert_eq!(symbols[0], "BERA");
        assert_eq!(symbols.len(), SWAP_TOKENS.len() + 1);
    }
}
