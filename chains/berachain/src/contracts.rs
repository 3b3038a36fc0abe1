//! Fixed bArtio addresses and contract bindings.

use anyhow::{Context, Result};
use ethers::prelude::*;
use std::str::FromStr;

pub const REWARD_POOLS: [(&str, &str); 4] = [
    ("HONEY-USDC", "0xe3b9B72ba027FD6c514C0e5BA075Ac9c77C23Afa"),
    ("HONEY-WBERA", "0xAD57d7d39a487C04a44D3522b910421888Fb9C6d"),
    ("WEBERA", "0x86DA232f6A4d146151755Ccf3e4555eadCc24cCF"),
    ("WBERA-YEET", "0x175e2429bCb92643255abCbCDF47Fff63F7990CC"),
];

pub const BGT: &str = "0xbDa130737BDd9618301681329bF2e46A016ff9Ad";

pub const VALIDATORS: [(&str, &str); 6] = [
    ("Infrared", "0x2D764DFeaAc00390c69985631aAA7Cc3fcfaFAfF"),
    ("Kodiak", "0x0eCBe62654622e14ae882B8c8c65C3f3F54eCcf9"),
    ("TheHoneyJar", "0x34D023ACa5A227789B45A62D377b5B18A680BE01"),
    ("BeraLand", "0x35c1e9C7803b47af738f37Beada3c7c35Eed73d4"),
    ("TTT", "0xB791098b00AD377B220f91d7878d19e441388eD8"),
    ("StakeLab", "0xC5b889a28950e7F8c1F279f758d8a0ab1C89cC38"),
];

pub const BEX_ROUTER: &str = "0x21e2C0AFd058A89FCf7caf3aEA3cB84Ae977B73D";
pub const WBERA: &str = "0x7507c1dc16935B82698e4C63f2746A2fCf994dF8";
pub const YEET: &str = "0x1740F679325ef3686B2f574e392007A92e4BeD41";
pub const BEX_POOL_IDX: u64 = 36000;

pub const KODIAK_LP_MANAGER: &str = "0x5E51894694297524581353bc1813073C512852bf";
pub const KODIAK_ISLAND: &str = "0xE5A2ab5D2fb268E5fF43A5564e44c3309609aFF9";

pub const MEMESWAP_VAULT: &str = "0xeec938A59B81e35F5a1DcE882D295703845fd3b4";

pub const BERANAMES_REGISTRAR: &str = "0xccc13A84eC34f3b1FbEF193557a68F9af2173Ab9";
pub const BERANAMES_RESOLVER: &str = "0x34Bb7CC576FA4B5f31f984a65dDB7Ff78b8Ecbe0";
pub const BERANAMES_DURATION_SECS: u64 = 31_536_000;

pub const TESTNET_FREE_MINT: &str = "0x272a7F8D8fA48949b44Dd424551C7CC540C2ff39";
pub const EDITION_CREATOR: &str = "0x744fC4e7f66b659b0081dE3BbF02aFDCe667c05D";
pub const EDITION_SIZE: u64 = 9_007_199_254_740_991;
pub const EDITION_ROYALTY_BPS: u16 = 100;

pub const WAGMI_TOKEN: &str = "0x157Ab16d344727510E6BC3B294E0824a6a6CAAfD";
pub const WAGMI_STAKE: &str = "0x8B97eB703EF7A302b8A5213A48e385489452b56c";

pub const BERASWAP_ROUTER: &str = "0x0468f03624A0b36614F34F7Fa3b615e9F39E70E2";

/// Symbol of the native coin in swap prompts; routed through WBERA.
pub const NATIVE_SYMBOL: &str = "BERA";

/// ERC-20 tokens offered by the router swap.
pub const SWAP_TOKENS: [(&str, &str); 4] = [
    ("WBERA", WBERA),
    ("YEET", YEET),
    ("HONEY", "0x0E4aaF1351de4c0264C5c7056Ef3777b41BD8e03"),
    ("USDC", "0xd6D83aF58a19Cd14eF3CF6fe848C9A4d21e5727c"),
];

pub fn address(raw: &str) -> Result<Address> {
    Address::from_str(raw).with_context(|| format!("Invalid address constant {}", raw))
}

/// Known validator name for `addr`, or the short hex form.
pub fn validator_name(addr: Address) -> String {
    VALIDATORS
        .iter()
        .find(|(_, a)| Address::from_str(a).is_ok_and(|v| v == addr))
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| format!("{:?}", addr))
}

abigen!(
    BeraSwapRouter,
    r#"[
        function swapExactETHForTokens(uint256 amountOutMin, address[] path, address to, uint256 deadline) payable returns (uint256[] amounts)
        function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) returns (uint256[] amounts)
        function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) returns (uint256[] amounts)
    ]"#
);

abigen!(
    RewardVault,
    r#"[
        function earned(address account) view returns (uint256)
        function getReward(address account) returns (uint256)
    ]"#
);

abigen!(
    BgtToken,
    r#"[
        function unboostedBalanceOf(address account) view returns (uint256)
        function queueBoost(address validator, uint128 amount)
        function activateBoost(address validator) returns (bool)
    ]"#
);

abigen!(
    Erc20Token,
    r#"[
        function approve(address spender, uint256 amount) returns (bool)
        function allowance(address owner, address spender) view returns (uint256)
        function balanceOf(address owner) view returns (uint256)
        function decimals() view returns (uint8)
    ]"#
);

abigen!(
    WrappedBera,
    r#"[
        function deposit() payable
        function balanceOf(address owner) view returns (uint256)
    ]"#
);

abigen!(
    BexRouter,
    r#"[
        struct SwapStep { uint256 poolIdx; address base; address quote; bool isBuy; }
        function multiSwap(SwapStep[] steps, uint128 amount, uint128 minOut) payable returns (uint128)
    ]"#
);

abigen!(
    KodiakLpManager,
    r#"[
        function addLiquidityNative(address island, uint256 amount0Max, uint256 amount1Max, uint256 amount0Min, uint256 amount1Min, uint256 amountSharesMin, address receiver) payable returns (uint256, uint256, uint256)
    ]"#
);

abigen!(
    MemeSwapVault,
    r#"[
        function stake(address referrer) payable
        function claim(uint256 roundId, address account)
        function earned(address account) view returns (uint256)
    ]"#
);

abigen!(
    BeranamesRegistrar,
    r#"[
        struct RegisterRequest { string name; address owner; uint256 duration; address resolver; bytes[] data; bool reverseRecord; address referrer; }
        function register(RegisterRequest request) payable returns (uint256)
    ]"#
);

abigen!(
    TestnetFreeEdition,
    r#"[
        function purchase(uint256 quantity) payable returns (uint256)
    ]"#
);

abigen!(
    EditionCreator,
    r#"[
        struct SaleConfig { uint256 price; uint256 startTime; uint256 endTime; }
        function createEdition(string name, string symbol, uint64 editionSize, uint16 royaltyBPS, address fundsRecipient, address defaultAdmin, SaleConfig saleConfig, string description, string animationURI, string imageURI, bool isSoulbound) returns (address)
        event EditionCreated(address collectionAddress)
    ]"#
);

abigen!(
    WagmiToken,
    r#"[
        function faucet(address _to)
        function approve(address spender, uint256 amount) returns (bool)
        function balanceOf(address owner) view returns (uint256)
    ]"#
);

abigen!(
    WagmiStake,
    r#"[
        function stake(uint256 amount) returns (bool)
    ]"#
);
