//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! These are the configuration-phase failures that abort a run before any
//! wallet is touched. Per-wallet failures are data, see [`crate::traits::FailureReason`].

use thiserror::Error;

/// Unified error type for core-logic operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Wallet(WalletError),

    #[error(transparent)]
    Network(NetworkError),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<WalletError> for CoreError {
    fn from(e: WalletError) -> Self {
        CoreError::Wallet(e)
    }
}

impl From<NetworkError> for CoreError {
    fn from(e: NetworkError) -> Self {
        CoreError::Network(e)
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Parse error for '{path}': {msg}")]
    ParseError { path: String, msg: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },
}

/// Wallet store and selection errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet ID {id} not found (total wallets: {total})")]
    NotFound { id: u32, total: usize },

    #[error("Duplicate wallet ID {id} in wallet store")]
    DuplicateId { id: u32 },

    #[error("Wallet store is empty")]
    EmptyStore,

    #[error("Invalid address for wallet {id}: '{address}'")]
    InvalidAddress { id: u32, address: String },

    #[error("Invalid private key format for wallet {id}: expected hex string")]
    InvalidKeyFormat { id: u32 },

    #[error("Private key for wallet {id} has wrong length: expected 64 hex chars, got {length}")]
    InvalidKeyLength { id: u32, length: usize },

    #[error("Invalid wallet ID '{input}': expected a positive integer")]
    InvalidId { input: String },

    #[error("No wallet IDs were entered")]
    NoIdsEntered,
}

/// Subgraph HTTP errors
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("HTTP error {status_code} from {endpoint}")]
    HttpError { status_code: u16, endpoint: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}
