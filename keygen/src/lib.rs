//! Solana key pair generation and inspection

pub mod keypair;

pub use keypair::{GeneratedKeypair, KEYPAIR_LENGTH, KeygenError};

use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Write `keypair` as a Solana CLI key file; refuses to overwrite unless `force`
pub fn write_keypair_file(keypair: &GeneratedKeypair, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists, pass --force to overwrite", path.display());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(path, keypair.to_json_bytes()?)
        .with_context(|| format!("Failed to write {}", path.display()))
}
