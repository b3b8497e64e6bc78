use crate::{
    balance::resolve_balance,
    broadcaster::sign_and_send,
    chains::SwapAggregator,
    context::SwapContext,
    types::{QuoteRequest, RoundOutcome, RoundSchedule, RunReport, SwapError, SwapPlan, WSOL_MINT},
    units::{to_base_units, to_ui_amount},
};
use log::{debug, error, info};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use tokio::time::sleep;

/// Run one exact-input swap: balance, conversion, quote, build, sign, send.
///
/// Fails before any aggregator call when the owner cannot cover the amount.
pub async fn execute_swap(ctx: &SwapContext, plan: &SwapPlan) -> Result<Signature, SwapError> {
    let owner = ctx.owner();
    let balance = resolve_balance(ctx, &owner, &plan.input_mint).await?;
    let amount = to_base_units(plan.amount_ui, balance.decimals)?;

    if balance.raw_amount < amount {
        return Err(SwapError::InsufficientBalance {
            required: amount,
            available: balance.raw_amount,
            required_ui: to_ui_amount(amount, balance.decimals),
            available_ui: balance.ui_amount,
        });
    }
    debug!(
        "Balance {} ({} raw) covers {} raw",
        balance.ui_amount, balance.raw_amount, amount
    );

    let quote = ctx
        .aggregator()
        .quote(&QuoteRequest {
            input_mint: plan.input_mint,
            output_mint: plan.output_mint,
            amount,
            slippage_bps: plan.slippage_bps,
        })
        .await?;
    if let Some(out_amount) = quote.out_amount() {
        debug!("Quoted {} -> {} base units", amount, out_amount);
    }

    let blob = ctx.aggregator().build_swap_transaction(&quote, &owner).await?;
    sign_and_send(ctx, &blob).await
}

/// Pick the output mint: the configured one, otherwise look `symbol` up
pub async fn resolve_output_mint(
    aggregator: &dyn SwapAggregator,
    configured: Option<Pubkey>,
    symbol: &str,
) -> Result<Pubkey, SwapError> {
    if let Some(mint) = configured {
        return Ok(mint);
    }

    info!("No output mint configured, looking up {} in the token list", symbol);
    aggregator
        .find_token_by_symbol(symbol)
        .await?
        .ok_or_else(|| SwapError::OutputMintNotFound(symbol.to_uppercase()))
}

/// Pair name for round logs, e.g. `SOL→FRAG`
pub fn pair_label(input_mint: &Pubkey, output_symbol: &str) -> String {
    let input = if *input_mint == WSOL_MINT {
        "SOL".to_string()
    } else {
        input_mint.to_string()
    };
    format!("{}→{}", input, output_symbol.to_uppercase())
}

/// Runs a fixed number of swap rounds back to back
pub struct SwapProcessor {
    context: SwapContext,
}

impl SwapProcessor {
    pub fn new(context: SwapContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &SwapContext {
        &self.context
    }

    /// Run every round of `schedule`; a failed round never stops the run
    pub async fn run(&self, plan: &SwapPlan, schedule: &RoundSchedule) -> RunReport {
        info!(
            "Starting {} rounds of {} {} (slippage {} bps)",
            schedule.rounds, plan.amount_ui, plan.label, plan.slippage_bps
        );

        let mut report = RunReport::default();
        for round in 1..=schedule.rounds {
            let outcome = self.execute_round(round, plan).await;
            report.outcomes.push(outcome);

            if round < schedule.rounds {
                sleep(schedule.delay).await;
            }
        }

        info!(
            "Finished {} rounds: {} succeeded, {} failed",
            report.outcomes.len(),
            report.succeeded(),
            report.failed()
        );
        report
    }

    async fn execute_round(&self, round: u32, plan: &SwapPlan) -> RoundOutcome {
        debug!("Round {} started", round);
        let result = execute_swap(&self.context, plan).await;

        match &result {
            Ok(signature) => info!("#{} {} tx: {}", round, plan.label, signature),
            Err(e) => error!("Round {} error: {}", round, e),
        }

        RoundOutcome::new(round, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mocks::{LedgerCall, MockAggregator, MockLedger},
        types::ExecutionSettings,
    };
    use solana_sdk::signature::Keypair;
    use std::{sync::Arc, time::Duration};

    fn plan(amount_ui: f64) -> SwapPlan {
        SwapPlan {
            label: "SOL→FRAG".to_string(),
            input_mint: WSOL_MINT,
            output_mint: Pubkey::new_unique(),
            amount_ui,
            slippage_bps: 100,
        }
    }

    #[tokio::test]
    async fn test_invalid_amount_stops_before_quote() {
        let ledger = Arc::new(MockLedger::new().with_native_balance(1_000_000_000));
        let aggregator = Arc::new(MockAggregator::new());
        let ctx = SwapContext::new(
            ledger,
            aggregator.clone(),
            Keypair::new(),
            ExecutionSettings::default(),
        );

        let result = execute_swap(&ctx, &plan(-1.0)).await;
        assert!(matches!(result, Err(SwapError::InvalidAmount(_))));
        assert!(aggregator.quote_requests().is_empty());
    }

    #[tokio::test]
    async fn test_build_failure_skips_broadcast() {
        let ledger = Arc::new(MockLedger::new().with_native_balance(1_000_000_000));
        let aggregator = Arc::new(MockAggregator::new().with_build_error("stale quote"));
        let ctx = SwapContext::new(
            ledger.clone(),
            aggregator.clone(),
            Keypair::new(),
            ExecutionSettings::default(),
        );

        let result = execute_swap(&ctx, &plan(0.005)).await;
        assert!(matches!(result, Err(SwapError::BuildUnavailable(_))));
        assert_eq!(aggregator.build_count(), 1);
        assert_eq!(ledger.count(LedgerCall::SendTransaction), 0);
    }

    #[tokio::test]
    async fn test_resolve_output_mint_prefers_configured() {
        let aggregator = MockAggregator::new().with_token_list_offline();
        let configured = Pubkey::new_unique();

        let mint = resolve_output_mint(&aggregator, Some(configured), "FRAG").await.unwrap();
        assert_eq!(mint, configured);
        assert_eq!(aggregator.token_lookups(), 0);
    }

    #[tokio::test]
    async fn test_resolve_output_mint_lookup() {
        let frag = Pubkey::new_unique();
        let aggregator = MockAggregator::new().with_token("FRAG", frag);

        assert_eq!(resolve_output_mint(&aggregator, None, "frag").await.unwrap(), frag);

        let missing = resolve_output_mint(&aggregator, None, "BONK").await;
        assert!(matches!(missing, Err(SwapError::OutputMintNotFound(symbol)) if symbol == "BONK"));

        let offline = MockAggregator::new().with_token_list_offline();
        let result = resolve_output_mint(&offline, None, "FRAG").await;
        assert!(matches!(result, Err(SwapError::TokenListUnavailable(_))));
    }

    #[test]
    fn test_pair_label_names_input_asset() {
        assert_eq!(pair_label(&WSOL_MINT, "frag"), "SOL→FRAG");

        let usdc = Pubkey::new_unique();
        assert_eq!(pair_label(&usdc, "FRAG"), format!("{}→FRAG", usdc));
    }

    #[tokio::test]
    async fn test_zero_rounds_produce_empty_report() {
        let ctx = SwapContext::new(
            Arc::new(MockLedger::new()),
            Arc::new(MockAggregator::new()),
            Keypair::new(),
            ExecutionSettings::default(),
        );
        let processor = SwapProcessor::new(ctx);

        let schedule = RoundSchedule { rounds: 0, delay: Duration::from_millis(1) };
        let report = processor.run(&plan(0.005), &schedule).await;
        assert!(report.outcomes.is_empty());
    }
}
