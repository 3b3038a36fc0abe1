//! # Core Logic - Batched Wallet Engine
//!
//! Chain-agnostic pieces shared by the action crates under `chains/`.
//!
//! ## Modules
//!
//! - [`config`] - Runner and chain configuration
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - Wallet operations, tasks and their outcomes
//! - [`utils`] - Batch runner, wallet store, selection, retry, jitter, logging

pub mod config;
pub mod error;
pub mod traits;
pub mod utils;

pub use config::{ChainConfig, RunnerConfig};
pub use error::{ConfigError, CoreError, NetworkError, WalletError};
pub use traits::{
    operation_fn, FailureReason, OperationFn, OperationResult, Task, TaskOperation, TaskResult,
    WalletOperation,
};
pub use utils::{
    is_transient_error, parse_id_list, prompt_single_wallet, prompt_wallet_selection, round2,
    setup_logger, with_retry, BatchRunner, FixedJitter, Jitter, RetryConfig, RetryPolicy,
    RunReport, ThreadJitter, WalletRecord, WalletSelection, WalletStore,
};
