use crate::types::{JupiterConfig, Quote, QuoteRequest, SwapError, UnsignedTransaction};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::{str::FromStr, time::Duration};

/// Trait for the swap-routing service
#[async_trait]
pub trait SwapAggregator: Send + Sync {
    /// Exact-input quote for `request.amount` base units
    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError>;
    /// Unsigned transaction implementing `quote` for `user`
    async fn build_swap_transaction(
        &self,
        quote: &Quote,
        user: &Pubkey,
    ) -> Result<UnsignedTransaction, SwapError>;
    /// Mint of the first listed token whose symbol matches, ignoring case
    async fn find_token_by_symbol(&self, symbol: &str) -> Result<Option<Pubkey>, SwapError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapRequestBody<'a> {
    quote_response: &'a serde_json::Value,
    user_public_key: String,
    dynamic_compute_unit_limit: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponseBody {
    swap_transaction: Option<String>,
    last_valid_block_height: Option<u64>,
}

/// Entry of the aggregator's token list
#[derive(Debug, Clone, Deserialize)]
pub struct TokenListEntry {
    #[serde(alias = "id")]
    pub address: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Reject quote bodies that carry an error or no route
pub fn validate_quote(body: serde_json::Value) -> Result<Quote, SwapError> {
    if let Some(error) = body.get("error") {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(SwapError::QuoteUnavailable(message));
    }

    let has_route = body
        .get("routePlan")
        .and_then(|v| v.as_array())
        .is_some_and(|plan| !plan.is_empty());
    if !has_route {
        return Err(SwapError::QuoteUnavailable("No route found".to_string()));
    }

    Ok(Quote(body))
}

/// Pull the base64 transaction out of a swap response
pub fn decode_swap_response(body: serde_json::Value) -> Result<UnsignedTransaction, SwapError> {
    let response: SwapResponseBody = serde_json::from_value(body)
        .map_err(|e| SwapError::BuildUnavailable(format!("Unexpected swap response: {}", e)))?;

    let encoded = response.swap_transaction.ok_or_else(|| {
        SwapError::BuildUnavailable("Aggregator did not return a swap transaction".to_string())
    })?;

    if let Some(height) = response.last_valid_block_height {
        debug!("Swap transaction valid until block height {}", height);
    }

    general_purpose::STANDARD
        .decode(encoded.trim())
        .map(UnsignedTransaction)
        .map_err(|e| SwapError::BuildUnavailable(format!("Invalid base64 transaction: {}", e)))
}

/// First entry whose symbol matches, ignoring case
pub fn find_symbol(tokens: &[TokenListEntry], symbol: &str) -> Option<Pubkey> {
    tokens
        .iter()
        .filter(|t| {
            t.symbol
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(symbol))
        })
        .find_map(|t| match Pubkey::from_str(&t.address) {
            Ok(mint) => Some(mint),
            Err(e) => {
                warn!("Skipping {} entry with invalid address {}: {}", symbol, t.address, e);
                None
            }
        })
}

/// Jupiter swap API client
pub struct JupiterClient {
    http: reqwest::Client,
    config: JupiterConfig,
}

impl JupiterClient {
    pub fn new(config: JupiterConfig) -> Result<Self, SwapError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SwapError::Config(format!("HTTP client error: {}", e)))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl SwapAggregator for JupiterClient {
    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError> {
        debug!(
            "Requesting quote {} -> {} for {} base units",
            request.input_mint, request.output_mint, request.amount
        );

        let response = self
            .http
            .get(&self.config.quote_url)
            .query(&[
                ("inputMint", request.input_mint.to_string()),
                ("outputMint", request.output_mint.to_string()),
                ("amount", request.amount.to_string()),
                ("slippageBps", request.slippage_bps.to_string()),
                ("swapMode", "ExactIn".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SwapError::QuoteUnavailable(format!("HTTP {}: {}", status, body)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SwapError::QuoteUnavailable(format!("Quote parse error: {}", e)))?;

        validate_quote(body)
    }

    async fn build_swap_transaction(
        &self,
        quote: &Quote,
        user: &Pubkey,
    ) -> Result<UnsignedTransaction, SwapError> {
        let payload = SwapRequestBody {
            quote_response: quote.as_json(),
            user_public_key: user.to_string(),
            dynamic_compute_unit_limit: true,
        };

        let response = self
            .http
            .post(&self.config.swap_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SwapError::BuildUnavailable(format!("HTTP {}: {}", status, body)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SwapError::BuildUnavailable(format!("Swap response parse error: {}", e)))?;

        decode_swap_response(body)
    }

    async fn find_token_by_symbol(&self, symbol: &str) -> Result<Option<Pubkey>, SwapError> {
        let response = self
            .http
            .get(&self.config.token_list_url)
            .send()
            .await
            .map_err(|e| SwapError::TokenListUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SwapError::TokenListUnavailable(format!("HTTP {}", status)));
        }

        let tokens: Vec<TokenListEntry> = response
            .json()
            .await
            .map_err(|e| SwapError::TokenListUnavailable(format!("Token list parse error: {}", e)))?;

        debug!("Token list has {} entries", tokens.len());
        Ok(find_symbol(&tokens, symbol))
    }
}
