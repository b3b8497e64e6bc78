//! In-memory ledger and aggregator for tests
//!
//! Both mocks record every call so tests can assert which stages of the
//! pipeline ran.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use serde_json::json;
use solana_sdk::{
    hash::Hash,
    message::{Message, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};

use crate::{
    chains::{Ledger, SwapAggregator},
    types::{
        Quote, QuoteRequest, SignatureStatus, SwapError, TokenAccountBalance, UnsignedTransaction,
    },
};

/// Ledger operations recorded by [`MockLedger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCall {
    NativeBalance,
    TokenAccounts,
    MintDecimals,
    SendTransaction,
    SignatureStatus,
}

/// How [`MockLedger`] answers status polls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockConfirmation {
    /// Pending for the given number of polls, then confirmed
    ConfirmAfter(usize),
    Never,
    FailOnChain(String),
}

/// Scriptable in-memory ledger
pub struct MockLedger {
    native_lamports: u64,
    token_accounts: Vec<TokenAccountBalance>,
    mint_decimals: Option<u8>,
    supply_unreachable: bool,
    offline: bool,
    send_script: Mutex<VecDeque<Result<(), String>>>,
    confirmation: MockConfirmation,
    status_polls: AtomicUsize,
    calls: Mutex<Vec<LedgerCall>>,
    sent: Mutex<Vec<VersionedTransaction>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            native_lamports: 0,
            token_accounts: Vec::new(),
            mint_decimals: None,
            supply_unreachable: false,
            offline: false,
            send_script: Mutex::new(VecDeque::new()),
            confirmation: MockConfirmation::ConfirmAfter(0),
            status_polls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_native_balance(mut self, lamports: u64) -> Self {
        self.native_lamports = lamports;
        self
    }

    pub fn with_token_accounts(mut self, accounts: Vec<TokenAccountBalance>) -> Self {
        self.token_accounts = accounts;
        self
    }

    pub fn with_mint_decimals(mut self, decimals: u8) -> Self {
        self.mint_decimals = Some(decimals);
        self
    }

    /// Supply lookups fail with a network error
    pub fn with_supply_unreachable(mut self) -> Self {
        self.supply_unreachable = true;
        self
    }

    /// Every query fails with a network error
    pub fn with_offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Outcomes of successive sends; once exhausted every send is accepted
    pub fn with_send_results(self, results: Vec<Result<(), String>>) -> Self {
        *self.send_script.lock().unwrap() = results.into();
        self
    }

    pub fn with_confirmation(mut self, confirmation: MockConfirmation) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: LedgerCall) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    pub fn sent_transactions(&self) -> Vec<VersionedTransaction> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, call: LedgerCall) -> Result<(), SwapError> {
        self.calls.lock().unwrap().push(call);
        if self.offline {
            return Err(SwapError::NetworkError("mock ledger is offline".to_string()));
        }
        Ok(())
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn native_balance(&self, _owner: &Pubkey) -> Result<u64, SwapError> {
        self.record(LedgerCall::NativeBalance)?;
        Ok(self.native_lamports)
    }

    async fn token_accounts(
        &self,
        _owner: &Pubkey,
        _mint: &Pubkey,
    ) -> Result<Vec<TokenAccountBalance>, SwapError> {
        self.record(LedgerCall::TokenAccounts)?;
        Ok(self.token_accounts.clone())
    }

    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8, SwapError> {
        self.record(LedgerCall::MintDecimals)?;
        if self.supply_unreachable {
            return Err(SwapError::NetworkError("mock supply query unreachable".to_string()));
        }
        self.mint_decimals
            .ok_or_else(|| SwapError::AssetMetadataUnavailable {
                mint: *mint,
                reason: "could not find mint".to_string(),
            })
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        _max_retries: usize,
    ) -> Result<Signature, SwapError> {
        self.record(LedgerCall::SendTransaction)?;
        let scripted = self.send_script.lock().unwrap().pop_front();
        if let Some(Err(reason)) = scripted {
            return Err(SwapError::BroadcastRejected(reason));
        }

        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures.first().copied().unwrap_or_default())
    }

    async fn signature_status(&self, _signature: &Signature) -> Result<SignatureStatus, SwapError> {
        self.record(LedgerCall::SignatureStatus)?;
        let polls = self.status_polls.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.confirmation {
            MockConfirmation::ConfirmAfter(pending) if polls >= *pending => SignatureStatus::Confirmed,
            MockConfirmation::ConfirmAfter(_) | MockConfirmation::Never => SignatureStatus::Pending,
            MockConfirmation::FailOnChain(reason) => SignatureStatus::Failed(reason.clone()),
        })
    }
}

/// Unsigned single-signer transaction paying from `payer`
pub fn unsigned_transaction_for(payer: &Pubkey) -> Result<UnsignedTransaction, SwapError> {
    let mut message = Message::new(&[], Some(payer));
    message.recent_blockhash = Hash::new_unique();

    let transaction = VersionedTransaction {
        signatures: vec![Signature::default(); message.header.num_required_signatures as usize],
        message: VersionedMessage::Legacy(message),
    };

    bincode::serialize(&transaction)
        .map(UnsignedTransaction)
        .map_err(|e| SwapError::Serialization(e.to_string()))
}

/// Scriptable in-memory aggregator
#[derive(Default)]
pub struct MockAggregator {
    quote_error: Option<String>,
    build_error: Option<String>,
    tokens: Vec<(String, Pubkey)>,
    token_list_offline: bool,
    quote_requests: Mutex<Vec<QuoteRequest>>,
    build_requests: Mutex<Vec<Pubkey>>,
    token_lookups: AtomicUsize,
}

impl MockAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote_error(mut self, message: &str) -> Self {
        self.quote_error = Some(message.to_string());
        self
    }

    pub fn with_build_error(mut self, message: &str) -> Self {
        self.build_error = Some(message.to_string());
        self
    }

    pub fn with_token(mut self, symbol: &str, mint: Pubkey) -> Self {
        self.tokens.push((symbol.to_string(), mint));
        self
    }

    pub fn with_token_list_offline(mut self) -> Self {
        self.token_list_offline = true;
        self
    }

    pub fn quote_requests(&self) -> Vec<QuoteRequest> {
        self.quote_requests.lock().unwrap().clone()
    }

    pub fn build_count(&self) -> usize {
        self.build_requests.lock().unwrap().len()
    }

    pub fn token_lookups(&self) -> usize {
        self.token_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SwapAggregator for MockAggregator {
    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError> {
        self.quote_requests.lock().unwrap().push(request.clone());
        if let Some(message) = &self.quote_error {
            return Err(SwapError::QuoteUnavailable(message.clone()));
        }

        Ok(Quote(json!({
            "inputMint": request.input_mint.to_string(),
            "outputMint": request.output_mint.to_string(),
            "inAmount": request.amount.to_string(),
            "outAmount": (request.amount / 7).to_string(),
            "slippageBps": request.slippage_bps,
            "swapMode": "ExactIn",
            "routePlan": [{ "percent": 100 }]
        })))
    }

    async fn build_swap_transaction(
        &self,
        _quote: &Quote,
        user: &Pubkey,
    ) -> Result<UnsignedTransaction, SwapError> {
        self.build_requests.lock().unwrap().push(*user);
        if let Some(message) = &self.build_error {
            return Err(SwapError::BuildUnavailable(message.clone()));
        }

        unsigned_transaction_for(user)
    }

    async fn find_token_by_symbol(&self, symbol: &str) -> Result<Option<Pubkey>, SwapError> {
        self.token_lookups.fetch_add(1, Ordering::SeqCst);
        if self.token_list_offline {
            return Err(SwapError::TokenListUnavailable("mock token list is offline".to_string()));
        }

        Ok(self
            .tokens
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
            .map(|(_, mint)| *mint))
    }
}
