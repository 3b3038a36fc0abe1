use crate::error::WalletError;
use crate::utils::wallet_manager::{parse_id_list, WalletRecord, WalletStore};
use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Input, Select};

/// Which wallets a run targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletSelection {
    All,
    Ids(Vec<u32>),
}

impl WalletSelection {
    pub fn resolve(&self, store: &WalletStore) -> Result<Vec<WalletRecord>, WalletError> {
        match self {
            WalletSelection::All => Ok(store.all().to_vec()),
            WalletSelection::Ids(ids) => store.select(ids),
        }
    }
}

/// Ask the operator for all wallets or a whitespace-separated id list.
pub fn prompt_wallet_selection(prompt: &str) -> Result<WalletSelection> {
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&["All wallets", "Specific IDs"])
        .default(0)
        .interact()
        .context("Wallet selection prompt failed")?;

    if choice == 0 {
        return Ok(WalletSelection::All);
    }

    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Wallet IDs (space separated, e.g. 1 2 4)")
        .interact_text()
        .context("Wallet id prompt failed")?;

    Ok(WalletSelection::Ids(parse_id_list(&raw)?))
}

/// Ask for exactly one wallet id.
pub fn prompt_single_wallet(store: &WalletStore) -> Result<WalletRecord> {
    let id: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Wallet ID (1-{})", store.len()))
        .interact_text()
        .context("Wallet id prompt failed")?;

    Ok(store.find(id)?.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn store() -> WalletStore {
        let records = (1..=3)
            .map(|id| WalletRecord::new(id, &format!("0x{:040x}", id), KEY))
            .collect();
        WalletStore::from_records(records).unwrap()
    }

    #[test]
    fn test_resolve_all() {
        let picked = WalletSelection::All.resolve(&store()).unwrap();
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn test_resolve_unknown_id() {
        let err = WalletSelection::Ids(vec![2, 42]).resolve(&store()).unwrap_err();
        assert_eq!(err, WalletError::NotFound { id: 42, total: 3 });
    }

    #[test]
    fn test_resolve_repeated_ids_once() {
        let picked = WalletSelection::Ids(vec![1, 1, 2]).resolve(&store()).unwrap();
        assert_eq!(picked.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
