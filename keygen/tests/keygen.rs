use ed25519_dalek::Verifier;
use frag_keygen::{GeneratedKeypair, KEYPAIR_LENGTH, write_keypair_file};
use std::fs;

#[test]
fn test_sign_and_verify() {
    let keypair = GeneratedKeypair::generate();

    let message = b"frag-swapper";
    let signature = keypair.sign(message);

    let verified = keypair.verifying_key().verify(message, &signature).is_ok();
    assert!(verified, "Signature verification failed");
    assert!(keypair.verifying_key().verify(b"tampered", &signature).is_err());
}

#[test]
fn test_base58_round_trip() {
    let keypair = GeneratedKeypair::generate();

    let restored = GeneratedKeypair::from_base58(&keypair.secret_key_base58()).unwrap();
    assert_eq!(restored.public_key_base58(), keypair.public_key_base58());

    let public = bs58::decode(keypair.public_key_base58()).into_vec().unwrap();
    assert_eq!(public.len(), 32);
}

#[test]
fn test_outfile_is_solana_cli_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("id.json");
    let keypair = GeneratedKeypair::generate();

    write_keypair_file(&keypair, &path, false).unwrap();

    let bytes: Vec<u8> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(bytes.len(), KEYPAIR_LENGTH);
    assert_eq!(bs58::encode(&bytes).into_string(), keypair.secret_key_base58());
}

#[test]
fn test_outfile_requires_force_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("id.json");

    let first = GeneratedKeypair::generate();
    write_keypair_file(&first, &path, false).unwrap();

    let second = GeneratedKeypair::generate();
    assert!(write_keypair_file(&second, &path, false).is_err());

    write_keypair_file(&second, &path, true).unwrap();
    let bytes: Vec<u8> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(bs58::encode(&bytes).into_string(), second.secret_key_base58());
}
