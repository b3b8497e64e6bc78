use crate::types::{SwapError, WalletConfig};
use solana_sdk::signature::Keypair;
use std::{fs, path::Path};

/// Parse a secret key given as base58 or as a JSON byte array
pub fn load_keypair(secret: &str) -> Result<Keypair, SwapError> {
    let secret = secret.trim();
    if secret.is_empty() {
        return Err(SwapError::Config("Private key is empty".to_string()));
    }

    let bytes: Vec<u8> = if secret.starts_with('[') {
        serde_json::from_str(secret)
            .map_err(|e| SwapError::Config(format!("Invalid JSON key bytes: {}", e)))?
    } else {
        bs58::decode(secret)
            .into_vec()
            .map_err(|e| SwapError::Config(format!("Invalid base58 private key: {}", e)))?
    };

    if bytes.len() != 64 {
        return Err(SwapError::Config(format!(
            "Private key must be 64 bytes, got {}",
            bytes.len()
        )));
    }

    Keypair::try_from(bytes.as_slice())
        .map_err(|e| SwapError::Config(format!("Invalid keypair bytes: {}", e)))
}

/// Read a Solana CLI key file (JSON byte array)
pub fn load_keypair_file(path: impl AsRef<Path>) -> Result<Keypair, SwapError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        SwapError::Config(format!("Cannot read key file {}: {}", path.display(), e))
    })?;
    load_keypair(&contents)
}

/// Load the signer from the wallet section, preferring the inline key
pub fn load_wallet(config: &WalletConfig) -> Result<Keypair, SwapError> {
    if !config.private_key.trim().is_empty() {
        load_keypair(&config.private_key)
    } else if !config.keypair_path.trim().is_empty() {
        load_keypair_file(config.keypair_path.trim())
    } else {
        Err(SwapError::Config(
            "Set PRIVATE_KEY_BASE58 or wallet.keypair_path".to_string(),
        ))
    }
}
