use anyhow::{Context, Result};
use frag_swapper::{
    config::parse_mint, create_sample_config, load_wallet, pair_label, resolve_output_mint,
    CliArgs, ConfigBuilder, JupiterClient, SolanaLedger, SwapContext, SwapPlan, SwapProcessor,
};
use log::info;
use solana_sdk::signature::Signer;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli_args = CliArgs::parse();
    if cli_args.sample_config {
        println!("{}", create_sample_config());
        return Ok(());
    }

    let log_level = cli_args.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("FRAG Swapper v{}", env!("CARGO_PKG_VERSION"));

    let config = ConfigBuilder::load(&cli_args).context("Failed to load configuration")?;
    let signer = load_wallet(&config.wallet).context("Failed to load wallet")?;
    info!("Bot pubkey: {}", signer.pubkey());
    info!("RPC: {}", config.solana.rpc_url);

    let ledger = Arc::new(SolanaLedger::new(&config.solana)?);
    let jupiter = Arc::new(JupiterClient::new(config.jupiter.clone())?);

    let input_mint = parse_mint(&config.swap.input_mint, "swap.input_mint")?;
    let configured_output = match config.swap.output_mint.trim() {
        "" => None,
        mint => Some(parse_mint(mint, "swap.output_mint")?),
    };
    let output_mint =
        resolve_output_mint(jupiter.as_ref(), configured_output, &config.swap.output_symbol)
            .await
            .context("Failed to resolve output mint")?;
    info!("{} mint: {}", config.swap.output_symbol.to_uppercase(), output_mint);

    let plan = SwapPlan {
        label: pair_label(&input_mint, &config.swap.output_symbol),
        input_mint,
        output_mint,
        amount_ui: config.swap.amount_ui,
        slippage_bps: config.swap.slippage_bps,
    };

    let context = SwapContext::new(ledger, jupiter, signer, config.execution_settings());
    let processor = SwapProcessor::new(context);
    let report = processor.run(&plan, &config.round_schedule()).await;

    info!(
        "Done. {} of {} rounds landed",
        report.succeeded(),
        report.outcomes.len()
    );

    Ok(())
}
