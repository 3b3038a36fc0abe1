use crate::task::TaskContext;
use anyhow::Result;
use core_logic::WalletRecord;
use ethers::prelude::*;
use ethers::utils::format_ether;
use futures::stream::{self, StreamExt};
use std::future::Future;
use tracing::{info, warn};

/// Keep wallets holding at least `min_balance` native BERA. Wallets whose
/// balance cannot be read are logged and dropped. At most `batch_size`
/// balance queries are in flight at once.
pub async fn filter_by_balance(
    ctx: &TaskContext,
    wallets: Vec<WalletRecord>,
    min_balance: U256,
) -> Vec<WalletRecord> {
    let limit = ctx.config.runner(None).batch_size;
    keep_funded(wallets, min_balance, limit, |address| async move {
        ctx.provider
            .get_balance(address, None)
            .await
            .map_err(anyhow::Error::from)
    })
    .await
}

/// Balance filter over any balance source, querying `limit` wallets at a time
/// in list order.
pub async fn keep_funded<Q, Fut>(
    wallets: Vec<WalletRecord>,
    min_balance: U256,
    limit: usize,
    query: Q,
) -> Vec<WalletRecord>
where
    Q: Fn(Address) -> Fut,
    Fut: Future<Output = Result<U256>>,
{
    let addresses: Vec<Result<Address>> = wallets.iter().map(TaskContext::address_of).collect();
    let balances: Vec<Result<U256>> = stream::iter(addresses)
        .map(|address| {
            let query = &query;
            async move { query(address?).await }
        })
        .buffered(limit.max(1))
        .collect()
        .await;

    let eligible: Vec<WalletRecord> = wallets
        .into_iter()
        .zip(balances)
        .filter_map(|(wallet, balance)| match balance {
            Ok(b) if b >= min_balance => Some(wallet),
            Ok(b) => {
                info!(
                    "[WL{:03}] skipped: balance {} BERA below {}",
                    wallet.id,
                    format_ether(b),
                    format_ether(min_balance)
                );
                None
            }
            Err(e) => {
                warn!("[WL{:03}] balance query failed: {:#}", wallet.id, e);
                None
            }
        })
        .collect();

    info!("Total eligible wallets: {}", eligible.len());
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn wallets(n: u32) -> Vec<WalletRecord> {
        (1..=n)
            .map(|id| WalletRecord::new(id, &format!("0x{:040x}", id), KEY))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_queries_are_bounded_by_limit() {
        let counters = (AtomicUsize::new(0), AtomicUsize::new(0));
        let (in_flight, peak) = (&counters.0, &counters.1);

        let kept = keep_funded(wallets(7), U256::from(1u64), 3, |_| async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(U256::from(5u64))
        })
        .await;

        assert_eq!(kept.len(), 7);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_drops_low_and_unreadable_wallets() {
        let low: Address = format!("0x{:040x}", 2).parse().unwrap();
        let broken: Address = format!("0x{:040x}", 3).parse().unwrap();

        let kept = keep_funded(wallets(4), U256::from(10u64), 10, |address| async move {
            if address == broken {
                return Err(anyhow::anyhow!("rate limited"));
            }
            Ok::<_, anyhow::Error>(if address == low {
                U256::from(9u64)
            } else {
                U256::from(10u64)
            })
        })
        .await;

        assert_eq!(kept.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1, 4]);
    }
}
