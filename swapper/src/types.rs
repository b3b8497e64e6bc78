use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::{fmt, time::Duration};

/// Core types shared by the swap pipeline and the round orchestrator

/// Wrapped SOL mint, used as the identifier of the native asset
pub const WSOL_MINT: Pubkey = solana_sdk::pubkey!("So11111111111111111111111111111111111111112");

/// Native SOL always has 9 decimals
pub const NATIVE_DECIMALS: u8 = 9;

/// Point-in-time read of an owner's holdings of one asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub raw_amount: u64,
    pub decimals: u8,
    pub ui_amount: f64,
}

impl BalanceSnapshot {
    pub fn new(raw_amount: u64, decimals: u8) -> Self {
        Self {
            raw_amount,
            decimals,
            ui_amount: crate::units::to_ui_amount(raw_amount, decimals),
        }
    }
}

/// One parsed token account as reported by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccountBalance {
    pub address: String,
    pub amount: u64,
    pub decimals: u8,
}

/// Confirmation state of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    Pending,
    Confirmed,
    Failed(String),
}

/// Exact-input quote request sent to the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub amount: u64,
    pub slippage_bps: u16,
}

/// Aggregator route, carried unmodified into the swap builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quote(pub serde_json::Value);

impl Quote {
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    /// Expected output in base units, if the aggregator reported one
    pub fn out_amount(&self) -> Option<u64> {
        self.0.get("outAmount")?.as_str()?.parse().ok()
    }
}

/// Versioned transaction bytes as returned by the swap builder, not yet signed
#[derive(Clone, PartialEq, Eq)]
pub struct UnsignedTransaction(pub Vec<u8>);

impl UnsignedTransaction {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for UnsignedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnsignedTransaction({} bytes)", self.0.len())
    }
}

/// What a single round swaps
#[derive(Debug, Clone, PartialEq)]
pub struct SwapPlan {
    /// Human-readable pair name used in round logs, e.g. `SOL→FRAG`
    pub label: String,
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub amount_ui: f64,
    pub slippage_bps: u16,
}

/// How many rounds to run and how long to wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSchedule {
    pub rounds: u32,
    pub delay: Duration,
}

/// Knobs used by the signer & broadcaster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSettings {
    pub max_retries: usize,
    pub confirm_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            confirm_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Result of one orchestrator round
#[derive(Debug)]
pub struct RoundOutcome {
    pub round: u32,
    pub result: Result<Signature, SwapError>,
    pub finished_at: DateTime<Utc>,
}

impl RoundOutcome {
    pub fn new(round: u32, result: Result<Signature, SwapError>) -> Self {
        Self {
            round,
            result,
            finished_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(signature) => write!(f, "#{} tx: {}", self.round, signature),
            Err(e) => write!(f, "#{} error: {}", self.round, e),
        }
    }
}

/// Ordered outcomes of a full run
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<RoundOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn signatures(&self) -> Vec<Signature> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().copied())
            .collect()
    }
}

/// Swapper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapperConfig {
    pub solana: SolanaConfig,
    pub jupiter: JupiterConfig,
    pub swap: SwapConfig,
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaConfig {
    pub rpc_url: String,
    pub commitment: String,
    pub max_retries: usize,
    pub confirm_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JupiterConfig {
    pub quote_url: String,
    pub swap_url: String,
    pub token_list_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    pub input_mint: String,
    /// Empty means "look `output_symbol` up in the token list"
    pub output_mint: String,
    pub output_symbol: String,
    pub amount_ui: f64,
    pub slippage_bps: u16,
    pub rounds: u32,
    pub round_delay_ms: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Base58 64-byte secret key
    #[serde(default)]
    pub private_key: String,
    /// Solana CLI JSON key file, used when `private_key` is empty
    #[serde(default)]
    pub keypair_path: String,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field(
                "private_key",
                &if self.private_key.is_empty() { "<unset>" } else { "<redacted>" },
            )
            .field("keypair_path", &self.keypair_path)
            .finish()
    }
}

impl SwapperConfig {
    pub fn execution_settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            max_retries: self.solana.max_retries,
            confirm_timeout: Duration::from_secs(self.solana.confirm_timeout_secs),
            poll_interval: Duration::from_millis(self.solana.poll_interval_ms),
        }
    }

    pub fn round_schedule(&self) -> RoundSchedule {
        RoundSchedule {
            rounds: self.swap.rounds,
            delay: Duration::from_millis(self.swap.round_delay_ms),
        }
    }
}

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Asset metadata unavailable for {mint}: {reason}")]
    AssetMetadataUnavailable { mint: Pubkey, reason: String },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: have {available_ui}, need {required_ui} (raw {available} < {required})")]
    InsufficientBalance {
        required: u64,
        available: u64,
        required_ui: f64,
        available_ui: f64,
    },

    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("Swap transaction unavailable: {0}")]
    BuildUnavailable(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Broadcast rejected: {0}")]
    BroadcastRejected(String),

    #[error("Confirmation timeout after {timeout:?}: {signature}")]
    ConfirmationTimeout { signature: Signature, timeout: Duration },

    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed { signature: Signature, reason: String },

    #[error("Token list unavailable: {0}")]
    TokenListUnavailable(String),

    #[error("{0} mint not found in token list. Set FRAG_MINT")]
    OutputMintNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        SwapError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for SwapError {
    fn from(err: reqwest::Error) -> Self {
        SwapError::NetworkError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_snapshot_consistency() {
        let snapshot = BalanceSnapshot::new(1_500_000_000, 9);
        assert_eq!(snapshot.raw_amount, 1_500_000_000);
        assert!((snapshot.ui_amount - 1.5).abs() < f64::EPSILON);

        let zero = BalanceSnapshot::new(0, 6);
        assert_eq!(zero.ui_amount, 0.0);
    }

    #[test]
    fn test_quote_out_amount() {
        let quote = Quote(serde_json::json!({ "outAmount": "123456", "routePlan": [] }));
        assert_eq!(quote.out_amount(), Some(123456));

        let quote = Quote(serde_json::json!({ "outAmount": 5 }));
        assert_eq!(quote.out_amount(), None);
    }

    #[test]
    fn test_run_report_counts() {
        let report = RunReport {
            outcomes: vec![
                RoundOutcome::new(1, Ok(Signature::default())),
                RoundOutcome::new(2, Err(SwapError::BroadcastRejected("blockhash not found".into()))),
                RoundOutcome::new(3, Ok(Signature::default())),
            ],
        };

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.signatures().len(), 2);
        assert!(report.outcomes[1].to_string().starts_with("#2 error: Broadcast rejected"));
    }

    #[test]
    fn test_wallet_config_debug_redacts_key() {
        let wallet = WalletConfig {
            private_key: "5J3mBbAH58CpQ3Y5RNJpUKPE62SQ5tfcvU2JpbnkeyhfsYB1Jcn".to_string(),
            keypair_path: String::new(),
        };
        let rendered = format!("{:?}", wallet);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("5J3mBb"));
    }
}
