use crate::error::{ConfigError, CoreError, WalletError};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One entry of `wallets.json`.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct WalletRecord {
    pub id: u32,
    #[serde(rename = "wallet")]
    pub address: String,
    #[serde(rename = "privateKey")]
    pub private_key: String,
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("private_key", &"***REDACTED***")
            .finish()
    }
}

impl WalletRecord {
    pub fn new(id: u32, address: &str, private_key: &str) -> Self {
        Self {
            id,
            address: address.to_string(),
            private_key: private_key.to_string(),
        }
    }

    fn validate(&self) -> Result<(), WalletError> {
        let addr = self.address.strip_prefix("0x").unwrap_or("");
        if addr.len() != 40 || !addr.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(WalletError::InvalidAddress {
                id: self.id,
                address: self.address.clone(),
            });
        }

        let key = self
            .private_key
            .strip_prefix("0x")
            .unwrap_or(&self.private_key);
        if !key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(WalletError::InvalidKeyFormat { id: self.id });
        }
        if key.len() != 64 {
            return Err(WalletError::InvalidKeyLength {
                id: self.id,
                length: key.len(),
            });
        }
        Ok(())
    }
}

/// Read-only, validated list of operator wallets.
#[derive(Debug)]
pub struct WalletStore {
    wallets: Vec<WalletRecord>,
}

impl WalletStore {
    const WALLETS_FILE: &'static str = "wallets.json";

    /// Look for `wallets.json` in the current dir, then at the workspace root.
    pub fn discover() -> Result<Self, CoreError> {
        let candidates = vec![
            PathBuf::from(Self::WALLETS_FILE),
            PathBuf::from("../..").join(Self::WALLETS_FILE),
        ];

        for path in &candidates {
            if path.is_file() {
                return Self::load(path);
            }
        }

        Err(ConfigError::FileNotFound {
            path: Self::WALLETS_FILE.to_string(),
        }
        .into())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: shown.clone(),
                }
            } else {
                ConfigError::IoError {
                    path: shown.clone(),
                    msg: e.to_string(),
                }
            }
        })?;

        let wallets: Vec<WalletRecord> =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: shown.clone(),
                msg: e.to_string(),
            })?;

        let store = Self::from_records(wallets)?;
        info!("Loaded {} wallets from {}", store.len(), shown);
        Ok(store)
    }

    pub fn from_records(wallets: Vec<WalletRecord>) -> Result<Self, CoreError> {
        if wallets.is_empty() {
            return Err(WalletError::EmptyStore.into());
        }

        let mut seen = HashSet::new();
        for wallet in &wallets {
            if !seen.insert(wallet.id) {
                return Err(WalletError::DuplicateId { id: wallet.id }.into());
            }
            wallet.validate()?;
        }

        Ok(Self { wallets })
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Every wallet in store order.
    pub fn all(&self) -> &[WalletRecord] {
        &self.wallets
    }

    pub fn find(&self, id: u32) -> Result<&WalletRecord, WalletError> {
        self.wallets
            .iter()
            .find(|w| w.id == id)
            .ok_or(WalletError::NotFound {
                id,
                total: self.wallets.len(),
            })
    }

    /// Wallets for `ids`, in the order requested. Repeated ids are kept once,
    /// at their first position. Fails on the first unknown id.
    pub fn select(&self, ids: &[u32]) -> Result<Vec<WalletRecord>, WalletError> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| seen.insert(**id))
            .map(|id| self.find(*id).cloned())
            .collect()
    }
}

/// Parse operator input like `"1 2 4 5"` into wallet ids.
pub fn parse_id_list(input: &str) -> Result<Vec<u32>, WalletError> {
    let ids = input
        .split_whitespace()
        .map(|token| {
            token.parse::<u32>().map_err(|_| WalletError::InvalidId {
                input: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(WalletError::NoIdsEntered);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn record(id: u32) -> WalletRecord {
        WalletRecord::new(id, &format!("0x{:040x}", id), KEY)
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1 2  4\t5").unwrap(), vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_parse_id_list_rejects_garbage() {
        assert_eq!(
            parse_id_list("1 two 3"),
            Err(WalletError::InvalidId {
                input: "two".to_string()
            })
        );
        assert_eq!(parse_id_list("   "), Err(WalletError::NoIdsEntered));
    }

    #[test]
    fn test_select_keeps_request_order() {
        let store = WalletStore::from_records(vec![record(1), record(2), record(3)]).unwrap();
        let picked = store.select(&[3, 1]).unwrap();
        assert_eq!(picked.iter().map(|w| w.id).collect::<Vec<_>>(), vec![3, 1]);
    }

    #[test]
    fn test_select_unknown_id() {
        let store = WalletStore::from_records(vec![record(1), record(2)]).unwrap();
        assert_eq!(
            store.select(&[1, 9]).unwrap_err(),
            WalletError::NotFound { id: 9, total: 2 }
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let dbg = format!("{:?}", record(1));
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("4c0883a6"));
    }

    #[test]
    fn test_select_drops_repeated_ids() {
        let store = WalletStore::from_records(vec![record(1), record(2), record(3)]).unwrap();
        let picked = store.select(&[2, 1, 2, 1, 3]).unwrap();
        assert_eq!(picked.iter().map(|w| w.id).collect::<Vec<_>>(), vec![2, 1, 3]);
    }
}
