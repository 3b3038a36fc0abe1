use crate::config::BeraConfig;
use crate::utils::gas::GasManager;
use crate::utils::subgraph::SubgraphClient;
use anyhow::{Context, Result};
use core_logic::{Jitter, WalletRecord};
use ethers::prelude::*;
use std::sync::Arc;

pub mod t01_claim_bgt_rewards;
pub mod t02_delegate_bgt;
pub mod t03_bex_swap;
pub mod t04_kodiak_liquidity;
pub mod t05_memeswap_deposit;
pub mod t06_memeswap_claim;
pub mod t07_register_name;
pub mod t08_mint_nft;
pub mod t09_launch_collection;
pub mod t10_wagmi_stake;
pub mod t11_router_swap;

pub use self::t01_claim_bgt_rewards::ClaimBgtRewardsTask;
pub use self::t02_delegate_bgt::DelegateBgtTask;
pub use self::t03_bex_swap::BexSwapTask;
pub use self::t04_kodiak_liquidity::KodiakLiquidityTask;
pub use self::t05_memeswap_deposit::MemeSwapDepositTask;
pub use self::t06_memeswap_claim::MemeSwapClaimTask;
pub use self::t07_register_name::RegisterNameTask;
pub use self::t08_mint_nft::MintNftTask;
pub use self::t09_launch_collection::{CollectionDetails, LaunchCollectionTask};
pub use self::t10_wagmi_stake::WagmiStakeTask;
pub use self::t11_router_swap::RouterSwapTask;

pub use core_logic::traits::{Task, TaskResult};

pub type BeraClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Read-only handles shared by every operation of a run.
#[derive(Clone)]
pub struct TaskContext {
    pub provider: Arc<Provider<Http>>,
    pub config: BeraConfig,
    pub gas: Arc<GasManager>,
    pub subgraph: Arc<SubgraphClient>,
    pub jitter: Arc<dyn Jitter>,
}

impl TaskContext {
    pub fn new(provider: Arc<Provider<Http>>, config: BeraConfig, jitter: Arc<dyn Jitter>) -> Self {
        Self {
            gas: Arc::new(GasManager::new(provider.clone())),
            subgraph: Arc::new(SubgraphClient::new()),
            provider,
            config,
            jitter,
        }
    }

    /// A signer of its own for one wallet. Never shared between operations.
    pub fn signer(&self, wallet: &WalletRecord) -> Result<Arc<BeraClient>> {
        let key = wallet
            .private_key
            .strip_prefix("0x")
            .unwrap_or(&wallet.private_key);
        let local = key
            .parse::<LocalWallet>()
            .with_context(|| format!("Invalid private key for wallet {}", wallet.id))?
            .with_chain_id(self.config.chain_id);

        Ok(Arc::new(SignerMiddleware::new(
            (*self.provider).clone(),
            local,
        )))
    }

    pub fn address_of(wallet: &WalletRecord) -> Result<Address> {
        wallet
            .address
            .parse::<Address>()
            .with_context(|| format!("Invalid address for wallet {}", wallet.id))
    }

    pub async fn balance_of(&self, wallet: &WalletRecord) -> Result<U256> {
        let address = Self::address_of(wallet)?;
        Ok(self.provider.get_balance(address, None).await?)
    }
}
