use crate::config::RunnerConfig;
use crate::traits::{OperationResult, WalletOperation};
use crate::utils::wallet_manager::WalletRecord;
use futures::future::join_all;
use std::time::Instant;
use tracing::{info, warn, Instrument};

/// Totals for one [`BatchRunner::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub retried: usize,
    /// Wallets still failing once the run is over, in list order.
    pub failed: Vec<OperationResult>,
    pub batches_first_pass: usize,
    pub batches_retry_pass: usize,
}

impl RunReport {
    pub fn failed_ids(&self) -> Vec<u32> {
        self.failed.iter().map(|r| r.wallet_id).collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies a [`WalletOperation`] to a wallet list in fixed-size concurrent
/// batches, then gives failures one more pass.
///
/// Progress is logged as IDLE, RUNNING_BATCH(n), WAITING(n), RUNNING_RETRY, DONE.
pub struct BatchRunner {
    config: RunnerConfig,
}

impl BatchRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Number of batches `len` wallets are split into.
    pub fn batch_count(&self, len: usize) -> usize {
        len.div_ceil(self.batch_size())
    }

    fn batch_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    pub async fn run<O>(&self, wallets: &[WalletRecord], op: &O) -> RunReport
    where
        O: WalletOperation + ?Sized,
    {
        let start = Instant::now();
        let mut report = RunReport {
            attempted: wallets.len(),
            ..Default::default()
        };

        info!(
            "[{}] IDLE: {} wallets, batch size {}, delay {}ms",
            op.name(),
            wallets.len(),
            self.batch_size(),
            self.config.inter_batch_delay_ms
        );

        if wallets.is_empty() {
            info!("[{}] DONE: nothing to run", op.name());
            return report;
        }

        let first = self.run_pass(wallets, op, false).await;
        report.batches_first_pass = self.batch_count(wallets.len());

        let mut retry_set = Vec::new();
        let mut excluded = Vec::new();
        for result in first.into_iter().filter(|r| !r.success) {
            if self.config.retry_policy.should_retry(result.reason.as_ref()) {
                retry_set.push(result.wallet_id);
            } else {
                excluded.push(result);
            }
        }

        let mut retry_failed = Vec::new();
        if !retry_set.is_empty() {
            let retry_wallets: Vec<WalletRecord> = wallets
                .iter()
                .filter(|w| retry_set.contains(&w.id))
                .cloned()
                .collect();

            self.pause(op.name(), report.batches_first_pass).await;
            info!(
                "[{}] RUNNING_RETRY: {} wallets",
                op.name(),
                retry_wallets.len()
            );

            report.retried = retry_wallets.len();
            report.batches_retry_pass = self.batch_count(retry_wallets.len());
            retry_failed = self
                .run_pass(&retry_wallets, op, true)
                .await
                .into_iter()
                .filter(|r| !r.success)
                .collect();
        }

        let mut failed: Vec<OperationResult> = excluded.into_iter().chain(retry_failed).collect();
        failed.sort_by_key(|r| {
            wallets
                .iter()
                .position(|w| w.id == r.wallet_id)
                .unwrap_or(usize::MAX)
        });

        report.succeeded = report.attempted - failed.len();
        report.failed = failed;

        info!(
            "[{}] DONE in {:.1}s | Success: {} | Failed: {} | Retried: {}",
            op.name(),
            start.elapsed().as_secs_f64(),
            report.succeeded,
            report.failed.len(),
            report.retried
        );
        if !report.failed.is_empty() {
            let summary: Vec<String> = report
                .failed
                .iter()
                .map(|r| {
                    let reason = r.reason.as_ref().map(|r| r.as_str()).unwrap_or("UNKNOWN");
                    format!("WL{:03}({})", r.wallet_id, reason)
                })
                .collect();
            warn!("[{}] Still failing: {}", op.name(), summary.join(", "));
        }

        report
    }

    async fn run_pass<O>(
        &self,
        wallets: &[WalletRecord],
        op: &O,
        retry: bool,
    ) -> Vec<OperationResult>
    where
        O: WalletOperation + ?Sized,
    {
        let batches: Vec<&[WalletRecord]> = wallets.chunks(self.batch_size()).collect();
        let total = batches.len();
        let mut results = Vec::with_capacity(wallets.len());

        for (i, batch) in batches.into_iter().enumerate() {
            let n = i + 1;
            info!(
                "[{}] RUNNING_BATCH({}/{}){}: {} wallets",
                op.name(),
                n,
                total,
                if retry { " retry" } else { "" },
                batch.len()
            );

            let futures = batch.iter().map(|wallet| {
                let span = tracing::info_span!("wallet", wallet_id = wallet.id);
                op.execute(wallet).instrument(span)
            });
            results.extend(join_all(futures).await);

            if n < total {
                self.pause(op.name(), n).await;
            }
        }

        results
    }

    async fn pause(&self, name: &str, after_batch: usize) {
        let delay = self.config.inter_batch_delay();
        if delay.is_zero() {
            return;
        }
        info!(
            "[{}] WAITING({}): {}ms before next batch",
            name,
            after_batch,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_count() {
        let runner = BatchRunner::new(RunnerConfig::new(10, 0));
        assert_eq!(runner.batch_count(0), 0);
        assert_eq!(runner.batch_count(1), 1);
        assert_eq!(runner.batch_count(10), 1);
        assert_eq!(runner.batch_count(11), 2);
        assert_eq!(runner.batch_count(25), 3);
    }
}
