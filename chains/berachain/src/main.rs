use bera_actions::actions::{prompt_action, App};
use bera_actions::config::BeraConfig;
use bera_actions::task::TaskContext;

use anyhow::{Context, Result};
use clap::Parser;
use core_logic::{setup_logger, ThreadJitter, WalletStore};
use dotenv::dotenv;
use ethers::prelude::*;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Berachain bArtio wallet actions", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/berachain/config.toml")]
    config: String,
    /// Wallet store; defaults to the config value, then wallets.json discovery
    #[arg(short, long)]
    wallets: Option<String>,
}

fn load_store(args: &Args, config: &BeraConfig) -> Result<WalletStore> {
    let store = match args.wallets.as_ref().or(config.wallets_path.as_ref()) {
        Some(path) => WalletStore::load(path),
        None => WalletStore::discover(),
    };
    store.map_err(|e| {
        error!("Wallet store: {}", e);
        e.into()
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = setup_logger();
    dotenv().ok();

    let args = Args::parse();
    info!("Loading config from: {}", args.config);

    let config = BeraConfig::load(&args.config)
        .inspect_err(|e| error!("Failed to load config: {:#}", e))?;
    info!("Configuration loaded for chain ID: {}", config.chain_id);

    let store = load_store(&args, &config)?;

    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .with_context(|| format!("Invalid RPC URL {}", config.rpc_url))?;
    let ctx = TaskContext::new(Arc::new(provider), config, Arc::new(ThreadJitter));
    let app = App::new(ctx, store);

    loop {
        let action = prompt_action()?;
        info!("Selected: {}", action);
        if !app.run(action).await? {
            break;
        }
    }

    info!("Bye.");
    Ok(())
}
