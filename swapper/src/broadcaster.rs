use crate::{
    context::SwapContext,
    types::{SignatureStatus, SwapError, UnsignedTransaction},
};
use log::{debug, info};
use solana_sdk::{
    signature::{Keypair, Signature},
    transaction::VersionedTransaction,
};
use tokio::time::{sleep, timeout};

/// Decode the aggregator's transaction and sign it with `signer`.
///
/// The message is left untouched; the signer must be the transaction's only
/// required signer.
pub fn sign_transaction(
    blob: &UnsignedTransaction,
    signer: &Keypair,
) -> Result<VersionedTransaction, SwapError> {
    let unsigned: VersionedTransaction = bincode::deserialize(blob.as_bytes())
        .map_err(|e| SwapError::SigningFailed(format!("Failed to decode transaction: {}", e)))?;

    VersionedTransaction::try_new(unsigned.message, &[signer])
        .map_err(|e| SwapError::SigningFailed(e.to_string()))
}

/// Sign, submit once and wait for the configured commitment
pub async fn sign_and_send(
    ctx: &SwapContext,
    blob: &UnsignedTransaction,
) -> Result<Signature, SwapError> {
    let transaction = sign_transaction(blob, ctx.signer())?;

    let signature = ctx
        .ledger()
        .send_transaction(&transaction, ctx.settings().max_retries)
        .await?;
    info!("Submitted transaction {}", signature);

    wait_for_confirmation(ctx, &signature).await?;
    Ok(signature)
}

/// Poll the signature status until it is confirmed, fails or times out
pub async fn wait_for_confirmation(ctx: &SwapContext, signature: &Signature) -> Result<(), SwapError> {
    let settings = ctx.settings();

    match timeout(settings.confirm_timeout, async {
        loop {
            match ctx.ledger().signature_status(signature).await {
                Ok(SignatureStatus::Confirmed) => return Ok(()),
                Ok(SignatureStatus::Failed(reason)) => {
                    return Err(SwapError::TransactionFailed {
                        signature: *signature,
                        reason,
                    });
                }
                Ok(SignatureStatus::Pending) => {}
                Err(e) => debug!("Status poll for {} failed: {}", signature, e),
            }
            sleep(settings.poll_interval).await;
        }
    })
    .await
    {
        Ok(result) => result,
        Err(_) => Err(SwapError::ConfirmationTimeout {
            signature: *signature,
            timeout: settings.confirm_timeout,
        }),
    }
}
