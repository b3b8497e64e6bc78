use crate::{
    chains::solana::parse_commitment,
    types::{SwapError, SwapperConfig},
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use config::{Config, Environment, File};
use log::{info, warn};
use solana_sdk::pubkey::Pubkey;
use std::{path::Path, str::FromStr};

/// Configuration builder for the swapper
pub struct ConfigBuilder {
    config: Config,
}

/// CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_file: Option<String>,
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub keypair_path: Option<String>,
    pub output_mint: Option<String>,
    pub amount: Option<f64>,
    pub rounds: Option<u32>,
    pub slippage_bps: Option<u16>,
    pub log_level: Option<String>,
    pub sample_config: bool,
}

const DEFAULTS: &str = r#"
[solana]
rpc_url = "https://api.mainnet-beta.solana.com"
commitment = "confirmed"
max_retries = 3
confirm_timeout_secs = 60
poll_interval_ms = 500

[jupiter]
quote_url = "https://quote-api.jup.ag/v6/quote"
swap_url = "https://quote-api.jup.ag/v6/swap"
token_list_url = "https://tokens.jup.ag/tokens?tags=verified,community"
request_timeout_secs = 30

[swap]
input_mint = "So11111111111111111111111111111111111111112"
output_mint = ""
output_symbol = "FRAG"
amount_ui = 0.005
slippage_bps = 100
rounds = 3
round_delay_ms = 3000

[wallet]
private_key = ""
keypair_path = ""
"#;

impl CliArgs {
    /// Parse the process arguments
    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    pub fn command() -> Command {
        Command::new("frag-swapper")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Repeated exact-input SOL to FRAG swaps through Jupiter")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .env("FRAGSWAP_CONFIG_FILE"),
            )
            .arg(
                Arg::new("rpc-url")
                    .long("rpc-url")
                    .value_name("URL")
                    .help("Solana RPC URL")
                    .env("RPC_URL"),
            )
            .arg(
                Arg::new("private-key")
                    .long("private-key")
                    .value_name("BASE58")
                    .help("Signer secret key (base58, 64 bytes)")
                    .env("PRIVATE_KEY_BASE58")
                    .hide_env_values(true),
            )
            .arg(
                Arg::new("keypair")
                    .short('k')
                    .long("keypair")
                    .value_name("FILE")
                    .help("Solana CLI key file, used when no private key is given"),
            )
            .arg(
                Arg::new("output-mint")
                    .long("output-mint")
                    .value_name("MINT")
                    .help("Output token mint; looked up by symbol when unset")
                    .env("FRAG_MINT"),
            )
            .arg(
                Arg::new("amount")
                    .short('a')
                    .long("amount")
                    .value_name("SOL")
                    .help("Input amount per round")
                    .value_parser(clap::value_parser!(f64)),
            )
            .arg(
                Arg::new("rounds")
                    .short('n')
                    .long("rounds")
                    .value_name("N")
                    .help("Number of swap rounds")
                    .value_parser(clap::value_parser!(u32)),
            )
            .arg(
                Arg::new("slippage-bps")
                    .long("slippage-bps")
                    .value_name("BPS")
                    .help("Slippage tolerance in basis points")
                    .value_parser(clap::value_parser!(u16)),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)")
                    .env("LOG_LEVEL"),
            )
            .arg(
                Arg::new("sample-config")
                    .long("sample-config")
                    .help("Print a sample configuration file and exit")
                    .action(ArgAction::SetTrue),
            )
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_file: matches.get_one::<String>("config").cloned(),
            rpc_url: matches.get_one::<String>("rpc-url").cloned(),
            private_key: matches.get_one::<String>("private-key").cloned(),
            keypair_path: matches.get_one::<String>("keypair").cloned(),
            output_mint: matches.get_one::<String>("output-mint").cloned(),
            amount: matches.get_one::<f64>("amount").copied(),
            rounds: matches.get_one::<u32>("rounds").copied(),
            slippage_bps: matches.get_one::<u16>("slippage-bps").copied(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            sample_config: matches.get_flag("sample-config"),
        }
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration in order of precedence:
    /// defaults, config file, environment, CLI arguments
    pub fn load(cli_args: &CliArgs) -> Result<SwapperConfig, SwapError> {
        let mut builder = ConfigBuilder::new();

        builder.load_defaults()?;

        if let Some(config_file) = &cli_args.config_file {
            builder.load_file(config_file)?;
        } else {
            builder.try_load_default_files()?;
        }

        builder.load_environment()?;
        builder.apply_cli_overrides(cli_args)?;

        let config = builder.build()?;
        builder.validate_config(&config)?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    fn build(&self) -> Result<SwapperConfig, SwapError> {
        self.config
            .clone()
            .try_deserialize()
            .map_err(|e| SwapError::Config(format!("Configuration parsing error: {}", e)))
    }

    /// Load default configuration values
    fn load_defaults(&mut self) -> Result<(), SwapError> {
        self.config = Config::builder()
            .add_source(File::from_str(DEFAULTS, config::FileFormat::Toml))
            .build()
            .map_err(|e| SwapError::Config(format!("Default config error: {}", e)))?;

        Ok(())
    }

    /// Load configuration from file
    fn load_file(&mut self, path: &str) -> Result<(), SwapError> {
        if !Path::new(path).exists() {
            return Err(SwapError::Config(format!("Config file not found: {}", path)));
        }

        info!("Loading configuration from: {}", path);

        self.config = Config::builder()
            .add_source(self.config.clone())
            .add_source(File::with_name(path))
            .build()
            .map_err(|e| SwapError::Config(format!("Config file error: {}", e)))?;

        Ok(())
    }

    /// Try to load default configuration files
    fn try_load_default_files(&mut self) -> Result<(), SwapError> {
        for path in ["./config.toml", "./frag-swapper.toml"] {
            if Path::new(path).exists() {
                info!("Found default config file: {}", path);
                return self.load_file(path);
            }
        }

        warn!("No default config file found, using defaults and environment variables");
        Ok(())
    }

    /// Load `FRAGSWAP_SECTION__KEY` environment variables
    fn load_environment(&mut self) -> Result<(), SwapError> {
        self.config = Config::builder()
            .add_source(self.config.clone())
            .add_source(
                Environment::with_prefix("FRAGSWAP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| SwapError::Config(format!("Environment config error: {}", e)))?;

        Ok(())
    }

    /// Apply CLI argument overrides
    fn apply_cli_overrides(&mut self, cli_args: &CliArgs) -> Result<(), SwapError> {
        let override_error = |e: config::ConfigError| SwapError::Config(format!("CLI override error: {}", e));
        let mut builder = Config::builder().add_source(self.config.clone());

        if let Some(ref url) = cli_args.rpc_url {
            builder = builder.set_override("solana.rpc_url", url.as_str()).map_err(override_error)?;
        }

        if let Some(ref key) = cli_args.private_key {
            builder = builder.set_override("wallet.private_key", key.as_str()).map_err(override_error)?;
        }

        if let Some(ref path) = cli_args.keypair_path {
            builder = builder.set_override("wallet.keypair_path", path.as_str()).map_err(override_error)?;
        }

        if let Some(ref mint) = cli_args.output_mint {
            builder = builder.set_override("swap.output_mint", mint.trim()).map_err(override_error)?;
        }

        if let Some(amount) = cli_args.amount {
            builder = builder.set_override("swap.amount_ui", amount).map_err(override_error)?;
        }

        if let Some(rounds) = cli_args.rounds {
            builder = builder.set_override("swap.rounds", rounds as i64).map_err(override_error)?;
        }

        if let Some(bps) = cli_args.slippage_bps {
            builder = builder.set_override("swap.slippage_bps", bps as i64).map_err(override_error)?;
        }

        self.config = builder
            .build()
            .map_err(|e| SwapError::Config(format!("CLI config build error: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    fn validate_config(&self, config: &SwapperConfig) -> Result<(), SwapError> {
        if config.solana.rpc_url.is_empty() {
            return Err(SwapError::Config("Solana RPC URL is required".to_string()));
        }

        parse_commitment(&config.solana.commitment)?;

        if config.wallet.private_key.trim().is_empty() && config.wallet.keypair_path.trim().is_empty() {
            return Err(SwapError::Config(
                "Private key is required (PRIVATE_KEY_BASE58 or wallet.keypair_path)".to_string(),
            ));
        }

        parse_mint(&config.swap.input_mint, "swap.input_mint")?;
        if !config.swap.output_mint.trim().is_empty() {
            parse_mint(&config.swap.output_mint, "swap.output_mint")?;
        } else if config.swap.output_symbol.trim().is_empty() {
            return Err(SwapError::Config(
                "Either swap.output_mint or swap.output_symbol is required".to_string(),
            ));
        }

        if !config.swap.amount_ui.is_finite() || config.swap.amount_ui <= 0.0 {
            return Err(SwapError::Config("Swap amount must be greater than 0".to_string()));
        }

        if config.swap.rounds == 0 {
            return Err(SwapError::Config("Rounds must be greater than 0".to_string()));
        }

        if config.swap.slippage_bps > 10_000 {
            return Err(SwapError::Config(
                "Slippage must be at most 10000 bps".to_string(),
            ));
        }

        if config.solana.poll_interval_ms == 0 || config.solana.confirm_timeout_secs == 0 {
            return Err(SwapError::Config(
                "Confirmation timeout and poll interval must be greater than 0".to_string(),
            ));
        }

        info!("Configuration validation passed");
        Ok(())
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a mint address from configuration
pub fn parse_mint(value: &str, field: &str) -> Result<Pubkey, SwapError> {
    Pubkey::from_str(value.trim())
        .map_err(|e| SwapError::Config(format!("Invalid {} '{}': {}", field, value, e)))
}

/// Create a sample configuration file
pub fn create_sample_config() -> String {
    r#"# frag-swapper configuration
# Copy this file to config.toml and update the values

[solana]
# Solana RPC endpoint
rpc_url = "https://api.mainnet-beta.solana.com"
# Commitment to wait for after broadcasting (confirmed or finalized)
commitment = "confirmed"
# Node-side rebroadcast attempts for each submitted transaction
max_retries = 3
# How long to wait for confirmation
confirm_timeout_secs = 60
# Signature status polling interval in milliseconds
poll_interval_ms = 500

[jupiter]
quote_url = "https://quote-api.jup.ag/v6/quote"
swap_url = "https://quote-api.jup.ag/v6/swap"
# Used to find the output mint by symbol when output_mint is empty
token_list_url = "https://tokens.jup.ag/tokens?tags=verified,community"
request_timeout_secs = 30

[swap]
# Wrapped SOL stands for native SOL
input_mint = "So11111111111111111111111111111111111111112"
# Leave empty to look output_symbol up in the token list
output_mint = ""
output_symbol = "FRAG"
# SOL spent per round
amount_ui = 0.005
# 1% slippage
slippage_bps = 100
rounds = 3
round_delay_ms = 3000

[wallet]
# Base58 secret key (keep secure!), or set PRIVATE_KEY_BASE58
private_key = ""
# Solana CLI key file used when private_key is empty
keypair_path = ""
"#
    .to_string()
}
