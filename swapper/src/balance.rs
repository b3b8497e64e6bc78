use crate::{
    context::SwapContext,
    types::{BalanceSnapshot, SwapError, NATIVE_DECIMALS, WSOL_MINT},
};
use log::{debug, warn};
use solana_sdk::pubkey::Pubkey;

/// Resolve the spendable balance of `mint` held by `owner`.
///
/// Native SOL is read from the owner's lamports. For SPL tokens only the
/// first token account is used; an owner with no account still gets the
/// mint's decimals from its supply metadata.
pub async fn resolve_balance(
    ctx: &SwapContext,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<BalanceSnapshot, SwapError> {
    if *mint == WSOL_MINT {
        let lamports = ctx.ledger().native_balance(owner).await?;
        return Ok(BalanceSnapshot::new(lamports, NATIVE_DECIMALS));
    }

    let accounts = ctx.ledger().token_accounts(owner, mint).await?;
    if let Some(first) = accounts.first() {
        if accounts.len() > 1 {
            warn!(
                "{} holds {} accounts for mint {}, using {}",
                owner,
                accounts.len(),
                mint,
                first.address
            );
        }
        return Ok(BalanceSnapshot::new(first.amount, first.decimals));
    }

    debug!("{} has no account for mint {}, reading decimals from supply", owner, mint);
    let decimals = ctx.ledger().mint_decimals(mint).await?;

    Ok(BalanceSnapshot::new(0, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mocks::{LedgerCall, MockAggregator, MockLedger},
        types::{ExecutionSettings, TokenAccountBalance},
    };
    use solana_sdk::signature::Keypair;
    use std::sync::Arc;

    fn context(ledger: Arc<MockLedger>) -> SwapContext {
        SwapContext::new(
            ledger,
            Arc::new(MockAggregator::default()),
            Keypair::new(),
            ExecutionSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_native_balance_uses_nine_decimals() {
        let ledger = Arc::new(MockLedger::new().with_native_balance(1_000_000_000));
        let ctx = context(ledger.clone());

        let snapshot = resolve_balance(&ctx, &ctx.owner(), &WSOL_MINT).await.unwrap();
        assert_eq!(snapshot, BalanceSnapshot::new(1_000_000_000, 9));
        assert!((snapshot.ui_amount - 1.0).abs() < f64::EPSILON);
        assert_eq!(ledger.calls(), vec![LedgerCall::NativeBalance]);
    }

    #[tokio::test]
    async fn test_token_balance_uses_first_account() {
        let mint = Pubkey::new_unique();
        let ledger = Arc::new(MockLedger::new().with_token_accounts(vec![
            TokenAccountBalance { address: "first".into(), amount: 2_500_000, decimals: 6 },
            TokenAccountBalance { address: "second".into(), amount: 9_000_000, decimals: 6 },
        ]));
        let ctx = context(ledger.clone());

        let snapshot = resolve_balance(&ctx, &ctx.owner(), &mint).await.unwrap();
        assert_eq!(snapshot.raw_amount, 2_500_000);
        assert_eq!(snapshot.decimals, 6);
        assert!((snapshot.ui_amount - 2.5).abs() < 1e-9);
        assert_eq!(ledger.calls(), vec![LedgerCall::TokenAccounts]);
    }

    #[tokio::test]
    async fn test_zero_balance_falls_back_to_supply_decimals() {
        let mint = Pubkey::new_unique();
        let ledger = Arc::new(MockLedger::new().with_mint_decimals(5));
        let ctx = context(ledger.clone());

        let snapshot = resolve_balance(&ctx, &ctx.owner(), &mint).await.unwrap();
        assert_eq!(snapshot, BalanceSnapshot::new(0, 5));
        assert_eq!(
            ledger.calls(),
            vec![LedgerCall::TokenAccounts, LedgerCall::MintDecimals]
        );
    }

    #[tokio::test]
    async fn test_missing_metadata_is_reported() {
        let mint = Pubkey::new_unique();
        let ledger = Arc::new(MockLedger::new());
        let ctx = context(ledger);

        let result = resolve_balance(&ctx, &ctx.owner(), &mint).await;
        match result {
            Err(SwapError::AssetMetadataUnavailable { mint: reported, .. }) => assert_eq!(reported, mint),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_supply_is_network_error() {
        let mint = Pubkey::new_unique();
        let ledger = Arc::new(MockLedger::new().with_supply_unreachable());
        let ctx = context(ledger.clone());

        let result = resolve_balance(&ctx, &ctx.owner(), &mint).await;
        assert!(matches!(result, Err(SwapError::NetworkError(_))));
        assert_eq!(
            ledger.calls(),
            vec![LedgerCall::TokenAccounts, LedgerCall::MintDecimals]
        );
    }

    #[tokio::test]
    async fn test_network_failure_is_propagated() {
        let ledger = Arc::new(MockLedger::new().with_offline());
        let ctx = context(ledger);

        let result = resolve_balance(&ctx, &ctx.owner(), &WSOL_MINT).await;
        assert!(matches!(result, Err(SwapError::NetworkError(_))));
    }
}
