//! # Utilities Module
//!
//! Engine pieces shared by every action: the batch runner, the wallet store,
//! selection prompts, retry helpers, jitter and logging.

pub mod jitter;
pub mod logger;
pub mod retry;
pub mod runner;
pub mod selection;
pub mod wallet_manager;

pub use jitter::{round2, FixedJitter, Jitter, ThreadJitter};
pub use logger::setup_logger;
pub use retry::{is_transient_error, with_retry, RetryConfig, RetryPolicy};
pub use runner::{BatchRunner, RunReport};
pub use selection::{prompt_single_wallet, prompt_wallet_selection, WalletSelection};
pub use wallet_manager::{parse_id_list, WalletRecord, WalletStore};
