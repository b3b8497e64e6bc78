use anyhow::Result;
use clap::Parser;
use frag_keygen::{GeneratedKeypair, write_keypair_file};
use std::path::PathBuf;

/// Generate or inspect Solana key pairs
#[derive(Parser, Debug)]
#[command(name = "frag-keygen", version)]
struct Args {
    /// Also write the key pair as a Solana CLI JSON key file
    #[arg(short, long, value_name = "PATH")]
    outfile: Option<PathBuf>,

    /// Overwrite an existing outfile
    #[arg(short, long, requires = "outfile")]
    force: bool,

    /// Print the public key of an existing base58 secret key
    #[arg(long, value_name = "BASE58", conflicts_with = "outfile")]
    inspect: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(secret) = args.inspect {
        let keypair = GeneratedKeypair::from_base58(&secret)?;
        println!("Public Key: {}", keypair.public_key_base58());
        return Ok(());
    }

    let keypair = GeneratedKeypair::generate();
    println!("Public Key: {}", keypair.public_key_base58());
    println!("Private Key (base58): {}", keypair.secret_key_base58());

    if let Some(path) = args.outfile {
        write_keypair_file(&keypair, &path, args.force)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
