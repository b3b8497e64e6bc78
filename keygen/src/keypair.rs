use ed25519_dalek::{SECRET_KEY_LENGTH, Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;

/// Length of a Solana secret key: 32-byte seed followed by the public key
pub const KEYPAIR_LENGTH: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum KeygenError {
    #[error("Invalid base58: {0}")]
    InvalidBase58(String),

    #[error("Secret key must be 64 bytes, got {0}")]
    InvalidLength(usize),

    #[error("Public half does not match the seed")]
    PublicKeyMismatch,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// An ed25519 key pair in Solana's encodings
pub struct GeneratedKeypair {
    signing_key: SigningKey,
}

impl GeneratedKeypair {
    /// Fresh key pair from the OS RNG
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Decode a base58 secret key and check its embedded public half
    pub fn from_base58(secret: &str) -> Result<Self, KeygenError> {
        let bytes = bs58::decode(secret.trim())
            .into_vec()
            .map_err(|e| KeygenError::InvalidBase58(e.to_string()))?;

        let keypair_bytes: [u8; KEYPAIR_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeygenError::InvalidLength(bytes.len()))?;

        let signing_key = SigningKey::from_keypair_bytes(&keypair_bytes)
            .map_err(|_| KeygenError::PublicKeyMismatch)?;

        Ok(Self { signing_key })
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn public_key_base58(&self) -> String {
        bs58::encode(self.verifying_key().as_bytes()).into_string()
    }

    /// Base58 of seed || public key, as wallets import it
    pub fn secret_key_base58(&self) -> String {
        bs58::encode(self.signing_key.to_keypair_bytes()).into_string()
    }

    /// Solana CLI key file contents: a JSON array of the 64 secret bytes
    pub fn to_json_bytes(&self) -> Result<String, KeygenError> {
        Ok(serde_json::to_string(&self.signing_key.to_keypair_bytes().to_vec())?)
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_key_layout() {
        let keypair = GeneratedKeypair::from_seed(&[7u8; SECRET_KEY_LENGTH]);
        let secret = bs58::decode(keypair.secret_key_base58()).into_vec().unwrap();

        assert_eq!(secret.len(), KEYPAIR_LENGTH);
        assert_eq!(&secret[..32], &[7u8; 32]);
        assert_eq!(&secret[32..], keypair.verifying_key().as_bytes());
    }

    #[test]
    fn test_rejects_mismatched_public_half() {
        let keypair = GeneratedKeypair::generate();
        let mut secret = keypair.signing_key.to_keypair_bytes();
        secret[63] ^= 0xff;

        let tampered = bs58::encode(secret).into_string();
        assert!(matches!(
            GeneratedKeypair::from_base58(&tampered),
            Err(KeygenError::PublicKeyMismatch)
        ));
    }

    #[test]
    fn test_rejects_short_key() {
        let short = bs58::encode([1u8; 32]).into_string();
        assert!(matches!(
            GeneratedKeypair::from_base58(&short),
            Err(KeygenError::InvalidLength(32))
        ));
        assert!(matches!(
            GeneratedKeypair::from_base58("0OIl"),
            Err(KeygenError::InvalidBase58(_))
        ));
    }
}
