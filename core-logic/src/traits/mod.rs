use crate::utils::wallet_manager::WalletRecord;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::time::Instant;
use tracing::{error, info, warn};

/// Short classification of why a wallet operation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    InsufficientFunds,
    CallException,
    /// Unclassified provider or client error, keeps the original message.
    Other(String),
    /// Operation-specific precondition, e.g. `CONVERSION_FAILED`.
    Precondition(&'static str),
}

impl FailureReason {
    pub fn as_str(&self) -> &str {
        match self {
            FailureReason::InsufficientFunds => "INSUFFICIENT_FUNDS",
            FailureReason::CallException => "CALL_EXCEPTION",
            FailureReason::Other(_) => "OTHER_ERROR",
            FailureReason::Precondition(code) => code,
        }
    }

    /// Failures that will not go away by submitting the same thing again.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            FailureReason::InsufficientFunds | FailureReason::CallException
        )
    }

    /// Map a chain-client error onto a reason.
    pub fn classify(error: &anyhow::Error) -> Self {
        let msg = format!("{:#}", error);
        let lower = msg.to_lowercase();

        if lower.contains("insufficient funds") {
            FailureReason::InsufficientFunds
        } else if lower.contains("execution reverted")
            || lower.contains("revert")
            || lower.contains("call exception")
            || lower.contains("call_exception")
        {
            FailureReason::CallException
        } else {
            FailureReason::Other(msg)
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one operation on one wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub wallet_id: u32,
    pub success: bool,
    pub reason: Option<FailureReason>,
}

impl OperationResult {
    pub fn success(wallet_id: u32) -> Self {
        Self {
            wallet_id,
            success: true,
            reason: None,
        }
    }

    pub fn failure(wallet_id: u32, reason: FailureReason) -> Self {
        Self {
            wallet_id,
            success: false,
            reason: Some(reason),
        }
    }
}

/// Unit of work applied to every wallet of a run.
#[async_trait]
pub trait WalletOperation: Send + Sync {
    fn name(&self) -> &str;

    /// Must not panic or propagate errors; failures are reported in the result.
    async fn execute(&self, wallet: &WalletRecord) -> OperationResult;
}

/// Wraps a closure as a [`WalletOperation`]. Mostly useful in tests and
/// for one-off operations that need no context type.
pub struct OperationFn<F> {
    name: String,
    f: F,
}

pub fn operation_fn<F, Fut>(name: &str, f: F) -> OperationFn<F>
where
    F: Fn(WalletRecord) -> Fut + Send + Sync,
    Fut: Future<Output = OperationResult> + Send,
{
    OperationFn {
        name: name.to_string(),
        f,
    }
}

#[async_trait]
impl<F, Fut> WalletOperation for OperationFn<F>
where
    F: Fn(WalletRecord) -> Fut + Send + Sync,
    Fut: Future<Output = OperationResult> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, wallet: &WalletRecord) -> OperationResult {
        (self.f)(wallet.clone()).await
    }
}

#[derive(Debug, Clone)]
pub struct TaskResult {
    pub success: bool,
    pub message: String,
    pub tx_hash: Option<String>,
    pub reason: Option<FailureReason>,
}

impl TaskResult {
    /// Work was submitted and confirmed.
    pub fn confirmed(message: impl Into<String>, tx_hash: Option<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            tx_hash,
            reason: None,
        }
    }

    /// Nothing to do for this wallet. Counts as success.
    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            tx_hash: None,
            reason: None,
        }
    }

    pub fn failed(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            tx_hash: None,
            reason: Some(reason),
        }
    }
}

/// A fallible per-wallet action that needs a context (provider, config, ...).
#[async_trait]
pub trait Task<Ctx>: Send + Sync {
    /// Returns the name of the task
    fn name(&self) -> &str;

    /// Executes the task for one wallet
    async fn run(&self, ctx: &Ctx, wallet: &WalletRecord) -> Result<TaskResult>;
}

/// Turns a [`Task`] into a [`WalletOperation`] by catching errors at the
/// wallet boundary and logging one result line per wallet.
pub struct TaskOperation<T, Ctx> {
    task: T,
    ctx: Ctx,
}

impl<T, Ctx> TaskOperation<T, Ctx> {
    pub fn new(task: T, ctx: Ctx) -> Self {
        Self { task, ctx }
    }
}

#[async_trait]
impl<T, Ctx> WalletOperation for TaskOperation<T, Ctx>
where
    T: Task<Ctx>,
    Ctx: Send + Sync,
{
    fn name(&self) -> &str {
        self.task.name()
    }

    async fn execute(&self, wallet: &WalletRecord) -> OperationResult {
        let start = Instant::now();
        match self.task.run(&self.ctx, wallet).await {
            Ok(res) if res.success => {
                info!(
                    target: "wallet_result",
                    "[WL{:03}] {} SUCCESS in {:.1}s: {}",
                    wallet.id,
                    self.task.name(),
                    start.elapsed().as_secs_f64(),
                    res.message
                );
                OperationResult::success(wallet.id)
            }
            Ok(res) => {
                let reason = res
                    .reason
                    .unwrap_or_else(|| FailureReason::Other(res.message.clone()));
                warn!(
                    target: "wallet_result",
                    "[WL{:03}] {} FAILED [{}]: {}",
                    wallet.id,
                    self.task.name(),
                    reason,
                    res.message
                );
                OperationResult::failure(wallet.id, reason)
            }
            Err(e) => {
                let reason = FailureReason::classify(&e);
                error!(
                    target: "wallet_result",
                    "[WL{:03}] {} FAILED [{}]: {:#}",
                    wallet.id,
                    self.task.name(),
                    reason,
                    e
                );
                OperationResult::failure(wallet.id, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_insufficient_funds() {
        let e = anyhow::anyhow!("(code: -32000, message: insufficient funds for gas * price + value)");
        assert_eq!(FailureReason::classify(&e), FailureReason::InsufficientFunds);
        assert_eq!(FailureReason::classify(&e).as_str(), "INSUFFICIENT_FUNDS");
    }

    #[test]
    fn test_classify_reverted() {
        let e = anyhow::anyhow!("Contract call reverted with data: 0x");
        assert_eq!(FailureReason::classify(&e), FailureReason::CallException);

        let e = anyhow::anyhow!("(code: 3, message: execution reverted: not allowed)");
        assert_eq!(FailureReason::classify(&e).as_str(), "CALL_EXCEPTION");
    }

    #[test]
    fn test_classify_context_chain_is_searched() {
        let e = anyhow::anyhow!("insufficient funds for intrinsic transaction cost")
            .context("Failed to send getReward");
        assert_eq!(FailureReason::classify(&e), FailureReason::InsufficientFunds);
    }

    #[test]
    fn test_classify_other_keeps_message() {
        let e = anyhow::anyhow!("connection reset by peer");
        match FailureReason::classify(&e) {
            FailureReason::Other(msg) => assert!(msg.contains("connection reset")),
            other => panic!("Expected Other, got {:?}", other),
        }
    }

    #[test]
    fn test_permanent_reasons() {
        assert!(FailureReason::InsufficientFunds.is_permanent());
        assert!(FailureReason::CallException.is_permanent());
        assert!(!FailureReason::Other("timeout".into()).is_permanent());
        assert!(!FailureReason::Precondition("CONVERSION_FAILED").is_permanent());
    }

    #[test]
    fn test_precondition_renders_code() {
        assert_eq!(
            FailureReason::Precondition("CONVERSION_FAILED").to_string(),
            "CONVERSION_FAILED"
        );
    }

    /// Task whose outcome is fixed up front.
    struct Scripted(fn() -> Result<TaskResult>);

    #[async_trait]
    impl Task<()> for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn run(&self, _ctx: &(), _wallet: &WalletRecord) -> Result<TaskResult> {
            (self.0)()
        }
    }

    fn wallet() -> WalletRecord {
        WalletRecord::new(
            4,
            "0x0000000000000000000000000000000000000004",
            "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
    }

    #[tokio::test]
    async fn test_task_error_is_classified_at_boundary() {
        let op = TaskOperation::new(
            Scripted(|| Err(anyhow::anyhow!("insufficient funds for gas * price + value"))),
            (),
        );
        let result = op.execute(&wallet()).await;

        assert!(!result.success);
        assert_eq!(result.wallet_id, 4);
        assert_eq!(result.reason, Some(FailureReason::InsufficientFunds));
    }

    #[tokio::test]
    async fn test_task_failure_keeps_its_reason() {
        let op = TaskOperation::new(
            Scripted(|| {
                Ok(TaskResult::failed(
                    FailureReason::Precondition("CONVERSION_FAILED"),
                    "wrap failed",
                ))
            }),
            (),
        );
        let result = op.execute(&wallet()).await;

        assert!(!result.success);
        assert_eq!(
            result.reason.as_ref().map(|r| r.as_str()),
            Some("CONVERSION_FAILED")
        );
    }

    #[tokio::test]
    async fn test_skipped_task_counts_as_success() {
        let op = TaskOperation::new(Scripted(|| Ok(TaskResult::skipped("nothing to claim"))), ());
        let result = op.execute(&wallet()).await;

        assert!(result.success);
        assert_eq!(result.reason, None);
    }
}
