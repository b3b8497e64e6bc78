use crate::types::{SignatureStatus, SolanaConfig, SwapError, TokenAccountBalance};
use async_trait::async_trait;
use log::debug;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::RpcSendTransactionConfig,
    rpc_request::TokenAccountsFilter,
};
use solana_sdk::{
    commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};
use std::sync::Arc;

/// Ledger queries and submissions used by the swap pipeline
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Native balance in lamports
    async fn native_balance(&self, owner: &Pubkey) -> Result<u64, SwapError>;
    /// Token accounts of `owner` holding `mint`, in the order the node returns them
    async fn token_accounts(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<TokenAccountBalance>, SwapError>;
    /// Decimals from the mint's supply metadata
    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, SwapError>;
    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        max_retries: usize,
    ) -> Result<Signature, SwapError>;
    async fn signature_status(&self, signature: &Signature) -> Result<SignatureStatus, SwapError>;
}

/// Parse the commitment a swap waits for; only `confirmed` and `finalized` are accepted
pub fn parse_commitment(commitment: &str) -> Result<CommitmentConfig, SwapError> {
    match commitment.trim() {
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        "processed" => Err(SwapError::Config(
            "Commitment 'processed' is weaker than confirmed".to_string(),
        )),
        other => Err(SwapError::Config(format!("Unknown commitment '{}'", other))),
    }
}

/// Transport failures never reached the node
fn is_transport_error(error: &ClientError) -> bool {
    matches!(error.kind(), ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_))
}

/// Extract the token amount of a jsonParsed token account
pub fn parse_token_account(
    address: &str,
    account: &serde_json::Value,
) -> Result<TokenAccountBalance, SwapError> {
    let token_amount = account
        .pointer("/data/parsed/info/tokenAmount")
        .ok_or_else(|| {
            SwapError::NetworkError(format!("Token account {} is not jsonParsed", address))
        })?;

    let amount = token_amount
        .get("amount")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| {
            SwapError::NetworkError(format!("Token account {} has no readable amount", address))
        })?;

    let decimals = token_amount
        .get("decimals")
        .and_then(|v| v.as_u64())
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| {
            SwapError::NetworkError(format!("Token account {} has no readable decimals", address))
        })?;

    Ok(TokenAccountBalance {
        address: address.to_string(),
        amount,
        decimals,
    })
}

/// Solana ledger backed by the nonblocking RPC client
pub struct SolanaLedger {
    client: Arc<RpcClient>,
    commitment: CommitmentConfig,
}

impl SolanaLedger {
    pub fn new(config: &SolanaConfig) -> Result<Self, SwapError> {
        if config.rpc_url.is_empty() {
            return Err(SwapError::Config("Solana RPC URL is required".to_string()));
        }

        let commitment = parse_commitment(&config.commitment)?;
        let client = Arc::new(RpcClient::new_with_commitment(
            config.rpc_url.clone(),
            commitment,
        ));

        Ok(Self { client, commitment })
    }

    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }
}

#[async_trait]
impl Ledger for SolanaLedger {
    async fn native_balance(&self, owner: &Pubkey) -> Result<u64, SwapError> {
        self.client
            .get_balance(owner)
            .await
            .map_err(|e| SwapError::NetworkError(format!("Failed to get balance of {}: {}", owner, e)))
    }

    async fn token_accounts(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<TokenAccountBalance>, SwapError> {
        let accounts = self
            .client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::Mint(*mint))
            .await
            .map_err(|e| {
                SwapError::NetworkError(format!("Failed to get {} accounts of {}: {}", mint, owner, e))
            })?;

        debug!("Found {} token accounts for mint {}", accounts.len(), mint);

        accounts
            .iter()
            .map(|keyed| {
                let account = serde_json::to_value(&keyed.account)?;
                parse_token_account(&keyed.pubkey, &account)
            })
            .collect()
    }

    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, SwapError> {
        let supply = self
            .client
            .get_token_supply(mint)
            .await
            .map_err(|e| {
                if is_transport_error(&e) {
                    SwapError::NetworkError(format!("Failed to get supply of {}: {}", mint, e))
                } else {
                    SwapError::AssetMetadataUnavailable {
                        mint: *mint,
                        reason: e.to_string(),
                    }
                }
            })?;

        Ok(supply.decimals)
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        max_retries: usize,
    ) -> Result<Signature, SwapError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(self.commitment.commitment),
            max_retries: Some(max_retries),
            ..Default::default()
        };

        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(|e| SwapError::BroadcastRejected(e.to_string()))
    }

    async fn signature_status(&self, signature: &Signature) -> Result<SignatureStatus, SwapError> {
        let statuses = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| {
                SwapError::NetworkError(format!("Failed to get status of {}: {}", signature, e))
            })?
            .value;

        Ok(match statuses.into_iter().next().flatten() {
            Some(status) => match status.err {
                Some(err) => SignatureStatus::Failed(err.to_string()),
                None if status.satisfies_commitment(self.commitment) => SignatureStatus::Confirmed,
                None => SignatureStatus::Pending,
            },
            None => SignatureStatus::Pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SolanaConfig {
        SolanaConfig {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            max_retries: 3,
            confirm_timeout_secs: 60,
            poll_interval_ms: 500,
        }
    }

    #[tokio::test]
    async fn test_solana_ledger_creation() {
        let ledger = SolanaLedger::new(&test_config());
        assert!(ledger.is_ok());
        assert_eq!(ledger.unwrap().commitment(), CommitmentConfig::confirmed());

        let mut config = test_config();
        config.rpc_url = String::new();
        assert!(matches!(SolanaLedger::new(&config), Err(SwapError::Config(_))));
    }

    #[test]
    fn test_parse_commitment() {
        assert_eq!(parse_commitment("finalized").unwrap(), CommitmentConfig::finalized());
        assert_eq!(parse_commitment("confirmed").unwrap(), CommitmentConfig::confirmed());
        assert!(matches!(parse_commitment("processed"), Err(SwapError::Config(_))));
        assert!(matches!(parse_commitment("bogus"), Err(SwapError::Config(_))));
    }

    #[tokio::test]
    async fn test_processed_commitment_is_rejected() {
        let mut config = test_config();
        config.commitment = "processed".to_string();
        assert!(matches!(SolanaLedger::new(&config), Err(SwapError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_rpc_supply_is_network_error() {
        let mut config = test_config();
        config.rpc_url = "http://127.0.0.1:1".to_string();
        let ledger = SolanaLedger::new(&config).unwrap();

        let result = ledger.mint_decimals(&Pubkey::new_unique()).await;
        assert!(matches!(result, Err(SwapError::NetworkError(_))), "{:?}", result);
    }

    #[test]
    fn test_token_account_parsing() {
        let account = serde_json::json!({
            "lamports": 2039280,
            "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
            "executable": false,
            "rentEpoch": 18446744073709551615u64,
            "space": 165,
            "data": {
                "program": "spl-token",
                "parsed": {
                    "type": "account",
                    "info": {
                        "isNative": false,
                        "mint": "FRAGTestMint1111111111111111111111111111111",
                        "owner": "Owner11111111111111111111111111111111111111",
                        "state": "initialized",
                        "tokenAmount": {
                            "amount": "2500000",
                            "decimals": 6,
                            "uiAmount": 2.5,
                            "uiAmountString": "2.5"
                        }
                    }
                },
                "space": 165
            }
        });

        let balance = parse_token_account("TokenAccount1", &account).unwrap();
        assert_eq!(balance.address, "TokenAccount1");
        assert_eq!(balance.amount, 2_500_000);
        assert_eq!(balance.decimals, 6);
    }

    #[test]
    fn test_token_account_parsing_rejects_binary_data() {
        let account = serde_json::json!({
            "data": ["AQAAAA==", "base64"]
        });

        assert!(parse_token_account("TokenAccount1", &account).is_err());
    }
}
