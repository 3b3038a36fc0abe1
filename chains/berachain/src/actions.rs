use crate::contracts::VALIDATORS;
use crate::task::{
    t03_bex_swap, t04_kodiak_liquidity, t05_memeswap_deposit, t08_mint_nft, t10_wagmi_stake,
    t11_router_swap, BexSwapTask, ClaimBgtRewardsTask, CollectionDetails, DelegateBgtTask,
    KodiakLiquidityTask, LaunchCollectionTask, MemeSwapClaimTask, MemeSwapDepositTask,
    MintNftTask, RegisterNameTask, RouterSwapTask, Task, TaskContext, WagmiStakeTask,
};
use crate::utils::eligibility::filter_by_balance;
use anyhow::{Context, Result};
use core_logic::{
    prompt_single_wallet, prompt_wallet_selection, BatchRunner, RunReport, TaskOperation,
    WalletRecord, WalletStore,
};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use ethers::utils::parse_ether;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ClaimBgtRewards,
    DelegateBgt,
    BexSwap,
    KodiakLiquidity,
    MemeSwapDeposit,
    MemeSwapClaim,
    RegisterName,
    MintNft,
    LaunchCollection,
    WagmiStake,
    RouterSwap,
    Exit,
}

impl Action {
    pub const ALL: [Action; 12] = [
        Action::ClaimBgtRewards,
        Action::DelegateBgt,
        Action::BexSwap,
        Action::KodiakLiquidity,
        Action::MemeSwapDeposit,
        Action::MemeSwapClaim,
        Action::RegisterName,
        Action::MintNft,
        Action::LaunchCollection,
        Action::WagmiStake,
        Action::RouterSwap,
        Action::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Action::ClaimBgtRewards => "BartioStation: claim BGT rewards",
            Action::DelegateBgt => "BartioStation: delegate BGT",
            Action::BexSwap => "BEX: swap WBERA to YEET",
            Action::KodiakLiquidity => "Kodiak: add YEET/BERA liquidity",
            Action::MemeSwapDeposit => "MemeSwap: deposit into vault",
            Action::MemeSwapClaim => "MemeSwap: claim vault rewards",
            Action::RegisterName => "Beranames: register a domain",
            Action::MintNft => "Testnet.Free: mint NFT",
            Action::LaunchCollection => "Testnet.Free: launch collection",
            Action::WagmiStake => "WAGMI: faucet, approve and stake",
            Action::RouterSwap => "BeraSwap: swap tokens through the router",
            Action::Exit => "Exit",
        }
    }
}

/// Which wallets an action offers to run over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletScope {
    /// Operator picks exactly one wallet.
    Single,
    /// Operator picks one wallet or all of them.
    OneOrAll,
    /// Operator picks all wallets or a list of ids.
    Selected,
    /// Every wallet in the store.
    Every,
}

impl Action {
    /// `None` for actions that choose wallets in their own prompt flow.
    pub fn scope(&self) -> Option<WalletScope> {
        match self {
            Action::ClaimBgtRewards => Some(WalletScope::OneOrAll),
            Action::BexSwap
            | Action::KodiakLiquidity
            | Action::MemeSwapDeposit
            | Action::MemeSwapClaim => Some(WalletScope::Selected),
            Action::RegisterName | Action::LaunchCollection | Action::RouterSwap => {
                Some(WalletScope::Single)
            }
            Action::MintNft | Action::WagmiStake => Some(WalletScope::Every),
            Action::DelegateBgt | Action::Exit => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn prompt_action() -> Result<Action> {
    let labels: Vec<String> = Action::ALL
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{}. {}", i + 1, a))
        .collect();

    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select an action")
        .items(&labels)
        .default(0)
        .interact()
        .context("Action prompt failed")?;

    Ok(Action::ALL[choice])
}

fn prompt_text(prompt: &str) -> Result<String> {
    Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()
        .with_context(|| format!("{} prompt failed", prompt))
}

/// Wires menu choices to tasks and the batch runner.
pub struct App {
    ctx: TaskContext,
    store: WalletStore,
}

impl App {
    pub fn new(ctx: TaskContext, store: WalletStore) -> Self {
        Self { ctx, store }
    }

    async fn run_batch<T>(
        &self,
        task: T,
        wallets: &[WalletRecord],
        delay_ms: Option<u64>,
    ) -> RunReport
    where
        T: Task<TaskContext>,
    {
        let runner = BatchRunner::new(self.ctx.config.runner(delay_ms));
        let op = TaskOperation::new(task, self.ctx.clone());
        runner.run(wallets, &op).await
    }

    fn one_or_all(&self, prompt: &str) -> Result<Vec<WalletRecord>> {
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&["One wallet", "All wallets"])
            .default(0)
            .interact()
            .context("Mode prompt failed")?;

        if choice == 0 {
            Ok(vec![prompt_single_wallet(&self.store)?])
        } else {
            Ok(self.store.all().to_vec())
        }
    }

    fn selected(&self, prompt: &str) -> Result<Vec<WalletRecord>> {
        Ok(prompt_wallet_selection(prompt)?.resolve(&self.store)?)
    }

    fn wallets_for(&self, scope: WalletScope, prompt: &str) -> Result<Vec<WalletRecord>> {
        match scope {
            WalletScope::Single => Ok(vec![prompt_single_wallet(&self.store)?]),
            WalletScope::OneOrAll => self.one_or_all(prompt),
            WalletScope::Selected => self.selected(prompt),
            WalletScope::Every => Ok(self.store.all().to_vec()),
        }
    }

    /// Returns `false` when the operator chose to exit.
    pub async fn run(&self, action: Action) -> Result<bool> {
        let wallets = match action.scope() {
            Some(scope) => self.wallets_for(scope, action.label())?,
            None => Vec::new(),
        };

        let report = match action {
            Action::Exit => return Ok(false),
            Action::ClaimBgtRewards => self.run_batch(ClaimBgtRewardsTask, &wallets, None).await,
            Action::DelegateBgt => {
                let mode = Select::with_theme(&ColorfulTheme::default())
                    .with_prompt("Delegation mode")
                    .items(&["Manual (one wallet, pick validator)", "Random validator per wallet"])
                    .default(0)
                    .interact()
                    .context("Mode prompt failed")?;

                if mode == 0 {
                    let wallet = prompt_single_wallet(&self.store)?;
                    let names: Vec<&str> = VALIDATORS.iter().map(|(n, _)| *n).collect();
                    let validator = Select::with_theme(&ColorfulTheme::default())
                        .with_prompt("Validator")
                        .items(&names)
                        .default(0)
                        .interact()
                        .context("Validator prompt failed")?;
                    self.run_batch(DelegateBgtTask::manual(validator), &[wallet], None)
                        .await
                } else {
                    let wallets = self.selected("Delegate from")?;
                    self.run_batch(DelegateBgtTask::random(), &wallets, None).await
                }
            }
            Action::BexSwap => {
                let min = parse_ether(t03_bex_swap::MIN_BERA_BALANCE)?;
                let eligible = filter_by_balance(&self.ctx, wallets, min).await;
                self.run_batch(BexSwapTask, &eligible, None).await
            }
            Action::KodiakLiquidity => {
                let min = parse_ether(t04_kodiak_liquidity::MIN_BERA_BALANCE)?;
                let eligible = filter_by_balance(&self.ctx, wallets, min).await;
                self.run_batch(KodiakLiquidityTask, &eligible, None).await
            }
            Action::MemeSwapDeposit => {
                self.run_batch(
                    MemeSwapDepositTask,
                    &wallets,
                    Some(t05_memeswap_deposit::INTER_BATCH_DELAY_MS),
                )
                .await
            }
            Action::MemeSwapClaim => self.run_batch(MemeSwapClaimTask, &wallets, None).await,
            Action::RegisterName => {
                let name = prompt_text("Domain name (without .bera)")?;
                self.run_batch(RegisterNameTask::new(&name), &wallets, None)
                    .await
            }
            Action::MintNft => {
                self.run_batch(
                    MintNftTask,
                    &wallets,
                    Some(t08_mint_nft::INTER_BATCH_DELAY_MS),
                )
                .await
            }
            Action::LaunchCollection => {
                let details = CollectionDetails::new(
                    &prompt_text("Collection name")?,
                    &prompt_text("Collection symbol")?,
                    &prompt_text("Collection description")?,
                    &prompt_text("Image URL (IPFS hash or full URL)")?,
                );
                self.run_batch(LaunchCollectionTask::new(details), &wallets, None)
                    .await
            }
            Action::WagmiStake => {
                let repeat = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Repeat every 9 to 12 hours?")
                    .default(false)
                    .interact()
                    .context("Repeat prompt failed")?;

                if repeat {
                    self.wagmi_forever(&wallets).await
                } else {
                    self.run_batch(WagmiStakeTask, &wallets, None).await
                }
            }
            Action::RouterSwap => self.router_swaps(wallets).await?,
        };

        info!(
            "Finished: {}/{} succeeded, {} still failing",
            report.succeeded,
            report.attempted,
            report.failed.len()
        );
        Ok(true)
    }

    /// One swap per prompt round until the operator stops; the wallet can be
    /// switched between rounds. Reports the last round.
    async fn router_swaps(&self, mut wallets: Vec<WalletRecord>) -> Result<RunReport> {
        let symbols = t11_router_swap::swap_symbols();
        let theme = ColorfulTheme::default();
        loop {
            let from = Select::with_theme(&theme)
                .with_prompt("Token A (sell)")
                .items(&symbols)
                .default(0)
                .interact()
                .context("Token prompt failed")?;
            let to = Select::with_theme(&theme)
                .with_prompt("Token B (buy)")
                .items(&symbols)
                .default(1)
                .interact()
                .context("Token prompt failed")?;
            let (from, to) = (symbols[from], symbols[to]);

            let report = match t11_router_swap::plan_route(from, to) {
                Ok(_) => {
                    let amount = parse_ether(prompt_text("Amount to swap")?.trim())?;
                    let task = RouterSwapTask::new(from, to, amount);
                    self.run_batch(task, &wallets, None).await
                }
                Err(e) => {
                    warn!("{:#}", e);
                    RunReport::default()
                }
            };

            let again = Confirm::with_theme(&theme)
                .with_prompt("Perform another swap?")
                .default(false)
                .interact()
                .context("Repeat prompt failed")?;
            if !again {
                return Ok(report);
            }

            let same = Confirm::with_theme(&theme)
                .with_prompt("Keep the same wallet?")
                .default(true)
                .interact()
                .context("Wallet prompt failed")?;
            if !same {
                wallets = vec![prompt_single_wallet(&self.store)?];
            }
        }
    }

    /// Never returns; the operator stops it with Ctrl+C.
    async fn wagmi_forever(&self, wallets: &[WalletRecord]) -> RunReport {
        loop {
            self.run_batch(WagmiStakeTask, wallets, None).await;
            let (low, high) = t10_wagmi_stake::REPEAT_HOURS_RANGE;
            let hours = self.ctx.jitter.range_u64(low..=high);
            info!("Waiting {} hours before the next WAGMI round", hours);
            tokio::time::sleep(t10_wagmi_stake::repeat_interval(hours)).await;
        }
    }
}
