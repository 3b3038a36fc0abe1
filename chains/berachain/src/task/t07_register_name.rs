use crate::contracts::{self, BeranamesRegistrar, RegisterRequest};
use crate::task::{Task, TaskContext, TaskResult};
use crate::utils::tx::{calldata, hash_of, send_and_confirm};
use anyhow::{bail, Result};
use async_trait::async_trait;
use core_logic::WalletRecord;
use ethers::prelude::*;
use ethers::utils::parse_ether;

pub const REGISTRATION_PRICE: &str = "0.1";

/// Register one Beranames domain for a year, owned by the wallet.
pub struct RegisterNameTask {
    name: String,
}

impl RegisterNameTask {
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_name(name),
        }
    }
}

/// Lowercase and drop a trailing `.bera`.
pub fn normalize_name(raw: &str) -> String {
    let name = raw.trim().to_lowercase();
    name.strip_suffix(".bera").unwrap_or(&name).to_string()
}

#[async_trait]
impl Task<TaskContext> for RegisterNameTask {
    fn name(&self) -> &str {
        "07_registerName"
    }

    async fn run(&self, ctx: &TaskContext, wallet: &WalletRecord) -> Result<TaskResult> {
        if self.name.is_empty() {
            bail!("domain name is empty");
        }
        let owner = TaskContext::address_of(wallet)?;
        let registrar_addr = contracts::address(contracts::BERANAMES_REGISTRAR)?;

        let request = RegisterRequest {
            name: self.name.clone(),
            owner,
            duration: U256::from(contracts::BERANAMES_DURATION_SECS),
            resolver: contracts::address(contracts::BERANAMES_RESOLVER)?,
            data: Vec::new(),
            reverse_record: false,
            referrer: Address::zero(),
        };

        let client = ctx.signer(wallet)?;
        let registrar = BeranamesRegistrar::new(registrar_addr, client.clone());
        let call = registrar.register(request);
        let tx = Eip1559TransactionRequest::new()
            .to(registrar_addr)
            .data(calldata(&call)?)
            .value(parse_ether(REGISTRATION_PRICE)?);

        let receipt = send_and_confirm(ctx, &client, tx, "register").await?;
        Ok(TaskResult::confirmed(
            format!("registered {}.bera", self.name),
            Some(hash_of(&receipt)),
        ))
    }
}
