//! FRAG swapper
//!
//! Repeated exact-input swaps from native SOL into FRAG through the Jupiter
//! aggregator on Solana mainnet.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use frag_swapper::{
//!     ExecutionSettings, JupiterClient, RoundSchedule, SolanaLedger, SwapContext,
//!     SwapPlan, SwapProcessor, SwapperConfig, WSOL_MINT,
//! };
//!
//! # async fn run(config: SwapperConfig, signer: solana_sdk::signature::Keypair,
//! #              frag: solana_sdk::pubkey::Pubkey) -> Result<(), Box<dyn std::error::Error>> {
//! let ledger = Arc::new(SolanaLedger::new(&config.solana)?);
//! let jupiter = Arc::new(JupiterClient::new(config.jupiter.clone())?);
//! let context = SwapContext::new(ledger, jupiter, signer, ExecutionSettings::default());
//!
//! let plan = SwapPlan {
//!     label: "SOL→FRAG".to_string(),
//!     input_mint: WSOL_MINT,
//!     output_mint: frag,
//!     amount_ui: 0.005,
//!     slippage_bps: 100,
//! };
//! let report = SwapProcessor::new(context)
//!     .run(&plan, &RoundSchedule { rounds: 3, delay: std::time::Duration::from_secs(3) })
//!     .await;
//!
//! for outcome in &report.outcomes {
//!     println!("{}", outcome);
//! }
//! # Ok(())
//! # }
//! ```

pub mod balance;
pub mod broadcaster;
pub mod chains;
pub mod config;
pub mod context;
pub mod mocks;
pub mod swap_processor;
pub mod types;
pub mod units;
pub mod wallet;

// Re-export public API
pub use balance::resolve_balance;
pub use broadcaster::{sign_and_send, sign_transaction, wait_for_confirmation};
pub use chains::{JupiterClient, Ledger, SolanaLedger, SwapAggregator};
pub use config::{create_sample_config, CliArgs, ConfigBuilder};
pub use context::SwapContext;
pub use swap_processor::{execute_swap, pair_label, resolve_output_mint, SwapProcessor};
pub use types::*;
pub use units::{to_base_units, to_ui_amount};
pub use wallet::load_wallet;
