use anyhow::{Context, Result};
use core_logic::{with_retry, NetworkError, RetryConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const USER_VALIDATOR_QUERY: &str = r#"
query GetUserValidatorInformation($address: String!) {
  userValidatorInformations(where: {user: $address}, first: 1000) {
    id
    amountQueued
    amountDeposited
    latestBlock
    user
    coinbase
  }
}"#;

const KODIAK_VAULT_QUERY: &str = r#"
query getIslandById($id: ID!) {
  kodiakVault(id: $id) {
    id
    outputTokenSupply
    _token0 { decimals }
    _token1 { decimals }
    pool { token0Price totalValueLockedToken0 totalValueLockedToken1 }
  }
}"#;

/// Blocks a queued boost must wait before it can be activated.
pub const BOOST_DELAY_BLOCKS: u64 = 10_000;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserValidatorInfo {
    pub id: String,
    pub amount_queued: String,
    pub amount_deposited: String,
    pub latest_block: String,
    pub user: String,
    pub coinbase: String,
}

impl UserValidatorInfo {
    pub fn amount_queued(&self) -> f64 {
        self.amount_queued.parse().unwrap_or(0.0)
    }

    /// Queued amount is positive and the activation delay has passed.
    pub fn is_ready(&self, current_block: u64) -> bool {
        if self.amount_queued() <= 0.0 {
            return false;
        }
        match self.latest_block.parse::<u64>() {
            Ok(latest) => latest + BOOST_DELAY_BLOCKS < current_block,
            Err(_) => false,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserValidatorData {
    user_validator_informations: Vec<UserValidatorInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenDecimals {
    pub decimals: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultPool {
    pub token0_price: String,
    pub total_value_locked_token0: String,
    pub total_value_locked_token1: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KodiakVault {
    pub id: String,
    pub output_token_supply: String,
    #[serde(rename = "_token0")]
    pub token0: TokenDecimals,
    #[serde(rename = "_token1")]
    pub token1: TokenDecimals,
    pub pool: VaultPool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KodiakVaultData {
    kodiak_vault: Option<KodiakVault>,
}

/// Thin Goldsky GraphQL client. Each request is retried on transient errors.
pub struct SubgraphClient {
    http: reqwest::Client,
    retry: RetryConfig,
}

impl Default for SubgraphClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SubgraphClient {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();

        Self {
            http,
            retry: RetryConfig::new(3, 1000),
        }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        let body = GraphQlRequest { query, variables };
        with_retry(self.retry.clone(), "subgraph query", || self.post_once(url, &body)).await
    }

    async fn post_once<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &GraphQlRequest<'_>,
    ) -> Result<T> {
        let resp = self.http.post(url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status_code: status.as_u16(),
                endpoint: url.to_string(),
            }
            .into());
        }

        let parsed: GraphQlResponse<T> = resp.json().await?;
        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            return Err(NetworkError::InvalidResponse {
                endpoint: url.to_string(),
                reason: Value::Array(errors).to_string(),
            }
            .into());
        }

        parsed.data.context("Subgraph response has no data")
    }

    pub async fn user_validator_infos(
        &self,
        url: &str,
        address: &str,
    ) -> Result<Vec<UserValidatorInfo>> {
        let data: UserValidatorData = self
            .query(
                url,
                USER_VALIDATOR_QUERY,
                json!({ "address": address.to_lowercase() }),
            )
            .await?;
        Ok(data.user_validator_informations)
    }

    pub async fn kodiak_vault(&self, url: &str, island: &str) -> Result<KodiakVault> {
        let data: KodiakVaultData = self
            .query(url, KODIAK_VAULT_QUERY, json!({ "id": island.to_lowercase() }))
            .await?;
        data.kodiak_vault
            .with_context(|| format!("kodiakVault {} not found", island))
    }
}
