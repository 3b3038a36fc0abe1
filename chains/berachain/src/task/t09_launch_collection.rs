use crate::contracts::{self, EditionCreatedFilter, EditionCreator, SaleConfig};
use crate::task::{Task, TaskContext, TaskResult};
use crate::utils::collections::{self, to_ipfs_uri, CollectionEntry};
use crate::utils::gas::{Fees, GasManager};
use crate::utils::tx::{calldata, hash_of, send_and_confirm};
use anyhow::Result;
use async_trait::async_trait;
use core_logic::WalletRecord;
use ethers::contract::parse_log;
use ethers::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn};

pub const GAS_LIMIT_RANGE: (u64, u64) = (700_000, 1_000_000);

#[derive(Debug, Clone)]
pub struct CollectionDetails {
    pub name: String,
    pub symbol: String,
    pub description: String,
    /// Already normalized to `ipfs://`.
    pub image_uri: String,
}

impl CollectionDetails {
    pub fn new(name: &str, symbol: &str, description: &str, image: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            symbol: symbol.trim().to_string(),
            description: description.trim().to_string(),
            image_uri: to_ipfs_uri(image),
        }
    }
}

/// Deploy a Testnet.Free open edition and record it in the local ledger.
pub struct LaunchCollectionTask {
    details: CollectionDetails,
    ledger: PathBuf,
}

impl LaunchCollectionTask {
    pub fn new(details: CollectionDetails) -> Self {
        Self {
            details,
            ledger: PathBuf::from(collections::LEDGER_FILE),
        }
    }

    pub fn with_ledger(mut self, ledger: PathBuf) -> Self {
        self.ledger = ledger;
        self
    }

    /// Append the deployed collection to the ledger. The edition already exists
    /// on chain at this point, so a ledger error is only logged.
    fn record(&self, deployer: &str, collection: Address) -> Option<CollectionEntry> {
        match collections::append_entry(&self.ledger, deployer, &format!("{:?}", collection)) {
            Ok(entry) => {
                info!(
                    "Recorded collection #{} at {:?} in {}",
                    entry.id,
                    collection,
                    self.ledger.display()
                );
                Some(entry)
            }
            Err(e) => {
                warn!(
                    "Collection {:?} deployed but not recorded in {}: {:#}",
                    collection,
                    self.ledger.display(),
                    e
                );
                None
            }
        }
    }
}

/// Address of the first `EditionCreated` event in `logs`.
pub fn created_collection(logs: &[Log]) -> Option<Address> {
    logs.iter()
        .find_map(|log| parse_log::<EditionCreatedFilter>(log.clone()).ok())
        .map(|event| event.collection_address)
}

#[async_trait]
impl Task<TaskContext> for LaunchCollectionTask {
    fn name(&self) -> &str {
        "09_launchCollection"
    }

    async fn run(&self, ctx: &TaskContext, wallet: &WalletRecord) -> Result<TaskResult> {
        let deployer = TaskContext::address_of(wallet)?;
        let creator_addr = contracts::address(contracts::EDITION_CREATOR)?;
        let d = &self.details;

        let client = ctx.signer(wallet)?;
        let creator = EditionCreator::new(creator_addr, client.clone());
        let sale = SaleConfig {
            price: U256::zero(),
            start_time: U256::zero(),
            end_time: U256::zero(),
        };
        let call = creator.create_edition(
            d.name.clone(),
            d.symbol.clone(),
            contracts::EDITION_SIZE,
            contracts::EDITION_ROYALTY_BPS,
            deployer,
            deployer,
            sale,
            d.description.clone(),
            String::new(),
            d.image_uri.clone(),
            false,
        );
        let gas = ctx.jitter.range_u64(GAS_LIMIT_RANGE.0..=GAS_LIMIT_RANGE.1);
        let tx = Eip1559TransactionRequest::new()
            .to(creator_addr)
            .data(calldata(&call)?)
            .gas(gas);

        let fees = Fees::fixed_gwei(GasManager::GWEI_TESTNET_FREE);
        let receipt = send_and_confirm(ctx, &client, fees.apply(tx), "createEdition").await?;

        let Some(collection) = created_collection(&receipt.logs) else {
            warn!("EditionCreated event not found in receipt logs");
            return Ok(TaskResult::confirmed(
                format!("launched {}, collection address unknown", d.name),
                Some(hash_of(&receipt)),
            ));
        };

        self.record(&wallet.address, collection);

        Ok(TaskResult::confirmed(
            format!("launched {} at {:?}", d.name, collection),
            Some(hash_of(&receipt)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_normalize_image() {
        let d = CollectionDetails::new(" Bears ", "BRS", "desc", "bafyhash.png");
        assert_eq!(d.name, "Bears");
        assert_eq!(d.image_uri, "ipfs://bafyhash.png");
    }

    #[test]
    fn test_created_collection_from_logs() {
        let collection: Address = "0x00000000000000000000000000000000000000c0".parse().unwrap();
        let topic = H256::from(ethers::utils::keccak256("EditionCreated(address)"));
        let log = Log {
            topics: vec![topic],
            data: ethers::abi::encode(&[ethers::abi::Token::Address(collection)]).into(),
            ..Default::default()
        };
        let unrelated = Log {
            topics: vec![H256::zero()],
            ..Default::default()
        };

        assert_eq!(created_collection(&[unrelated.clone(), log]), Some(collection));
        assert_eq!(created_collection(&[unrelated]), None);
    }

    #[test]
    fn test_record_survives_corrupt_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collections_created.json");
        std::fs::write(&path, "{ not json").unwrap();
        let details = CollectionDetails::new("Bears", "BRS", "d", "ipfs://x");
        let task = LaunchCollectionTask::new(details)
            .with_ledger(path.clone());
        let collection: Address = "0x00000000000000000000000000000000000000c0".parse().unwrap();

        assert!(task.record("0xaa", collection).is_none());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_record_appends_entry() {
        let dir = tempfile::tempdir().unwrap();
        let details = CollectionDetails::new("Bears", "BRS", "d", "ipfs://x");
        let task = LaunchCollectionTask::new(details)
            .with_ledger(dir.path().join("ledger.json"));
        let collection: Address = "0x00000000000000000000000000000000000000c0".parse().unwrap();

        let entry = task.record("0xaa", collection).unwrap();
        assert_eq!(entry.id, 1);
        assert_eq!(entry.nft_collection_address, format!("{:?}", collection));
    }
}
