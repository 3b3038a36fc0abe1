use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

pub const LEDGER_FILE: &str = "collections_created.json";
pub const DEFAULT_MINT_PRICE: &str = "0.01";

/// One launched Testnet.Free collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: u32,
    pub deployer_address: String,
    pub nft_collection_address: String,
    pub mint_price: String,
}

/// A missing ledger file reads as empty.
pub fn load_ledger(path: &Path) -> Result<Vec<CollectionEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Deployer's last id + 1, or 1 for a first collection.
pub fn next_id(entries: &[CollectionEntry], deployer: &str) -> u32 {
    entries
        .iter()
        .rev()
        .find(|c| c.deployer_address.eq_ignore_ascii_case(deployer))
        .map(|c| c.id + 1)
        .unwrap_or(1)
}

pub fn append_entry(path: &Path, deployer: &str, collection: &str) -> Result<CollectionEntry> {
    let mut entries = load_ledger(path)?;
    let entry = CollectionEntry {
        id: next_id(&entries, deployer),
        deployer_address: deployer.to_string(),
        nft_collection_address: collection.to_string(),
        mint_price: DEFAULT_MINT_PRICE.to_string(),
    };
    entries.push(entry.clone());

    let json = serde_json::to_string_pretty(&entries)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(entry)
}

/// Normalize an image reference to an `ipfs://` URI. Unrecognized input is
/// returned unchanged.
pub fn to_ipfs_uri(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("ipfs://") {
        return input.to_string();
    }

    if let Ok(hash) = Regex::new(r"^[a-zA-Z0-9]+(\.[a-zA-Z0-9]+)?$") {
        if hash.is_match(input) {
            return format!("ipfs://{}", input);
        }
    }

    if let Ok(gateway) =
        Regex::new(r"https?://(?:ipfs\.)?([a-zA-Z0-9]+)\.ipfs\.nftstorage\.link/(.+)")
    {
        if let Some(caps) = gateway.captures(input) {
            return format!("ipfs://{}", &caps[2]);
        }
    }

    warn!("Image URL is not in a recognized IPFS format, using it as-is");
    input.to_string()
}
