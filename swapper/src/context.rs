use crate::{
    chains::{Ledger, SwapAggregator},
    types::ExecutionSettings,
};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::sync::Arc;

/// Process-wide handles shared by every stage of the swap pipeline.
///
/// Built once at startup and passed by reference; nothing in it changes
/// between rounds.
pub struct SwapContext {
    ledger: Arc<dyn Ledger>,
    aggregator: Arc<dyn SwapAggregator>,
    signer: Keypair,
    settings: ExecutionSettings,
}

impl SwapContext {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        aggregator: Arc<dyn SwapAggregator>,
        signer: Keypair,
        settings: ExecutionSettings,
    ) -> Self {
        Self {
            ledger,
            aggregator,
            signer,
            settings,
        }
    }

    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    pub fn aggregator(&self) -> &dyn SwapAggregator {
        self.aggregator.as_ref()
    }

    pub fn signer(&self) -> &Keypair {
        &self.signer
    }

    pub fn owner(&self) -> Pubkey {
        self.signer.pubkey()
    }

    pub fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }
}
