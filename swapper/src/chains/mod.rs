pub mod jupiter;
pub mod solana;

pub use jupiter::{JupiterClient, SwapAggregator};
pub use solana::{Ledger, SolanaLedger};
