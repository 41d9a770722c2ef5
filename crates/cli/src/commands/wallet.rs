//! Wallet management command.

use super::Context;
use anyhow::{bail, Context as _, Result};
use bloxer_core::{Address, Keypair};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Wallet file name inside the data directory.
pub const WALLET_FILE: &str = "wallet.json";

#[derive(Args)]
pub struct WalletArgs {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand)]
enum WalletCommand {
    /// Create a new wallet
    Create,
    /// Show wallet address
    Show,
    /// Permanently delete your wallet
    Delete,
}

/// On-disk wallet: the address and the raw private scalar, both hex.
#[derive(Debug, Serialize, Deserialize)]
pub struct WalletFile {
    pub address: String,
    pub private_key: String,
}

impl WalletFile {
    fn from_keypair(keypair: &Keypair) -> Self {
        Self {
            address: keypair.address().to_string(),
            private_key: hex::encode(keypair.private_key()),
        }
    }

    /// Rebuild the keypair, checking it still matches the stored address.
    pub fn keypair(&self) -> Result<Keypair> {
        let bytes = hex::decode(&self.private_key).context("Invalid private key hex")?;
        if bytes.len() != 32 {
            bail!(
                "Invalid private key length: expected 32 bytes, got {}",
                bytes.len()
            );
        }
        let mut private_key = [0u8; 32];
        private_key.copy_from_slice(&bytes);

        let keypair = Keypair::from_private_key(&private_key)
            .context("Failed to create keypair from private key")?;
        if keypair.address().as_str() != self.address {
            bail!("Wallet file is inconsistent: address does not match private key");
        }
        Ok(keypair)
    }
}

pub fn run(args: WalletArgs, ctx: &Context) -> Result<()> {
    match args.command {
        WalletCommand::Create => create_wallet(ctx),
        WalletCommand::Show => show_wallet(ctx),
        WalletCommand::Delete => delete_wallet(ctx),
    }
}

fn create_wallet(ctx: &Context) -> Result<()> {
    let path = ctx.wallet_path();
    if path.exists() {
        bail!(
            "Wallet already exists! Use {} to see your address",
            "bloxer wallet show".bright_cyan()
        );
    }

    let keypair = Keypair::generate().context("Error generating key pair")?;
    let wallet = WalletFile::from_keypair(&keypair);

    fs::create_dir_all(ctx.data_dir())
        .with_context(|| format!("Failed to create data directory: {:?}", ctx.data_dir()))?;
    save_wallet(&path, &wallet)?;

    println!();
    println!("{}  Wallet created successfully!", "✓".green().bold());
    println!();
    println!("  {}", "Your address:".yellow());
    println!("  {}", wallet.address.bright_cyan());
    println!();
    println!("  {}", "Keep your wallet file safe!".yellow().bold());
    println!("  Location: {}", path.display().to_string().bright_black());
    println!();

    Ok(())
}

fn show_wallet(ctx: &Context) -> Result<()> {
    let wallet = load_wallet(&ctx.wallet_path())?;

    println!();
    println!("{}", "Your Wallet".bold().cyan());
    println!();
    println!("  {}", "Address:".yellow());
    println!("  {}", wallet.address);
    println!();

    Ok(())
}

fn delete_wallet(ctx: &Context) -> Result<()> {
    let path = ctx.wallet_path();
    if !path.exists() {
        bail!("No wallet found.");
    }
    fs::remove_file(&path).with_context(|| "Error deleting wallet")?;

    println!();
    println!("{}  Wallet deleted!", "✓".green().bold());
    println!();
    Ok(())
}

/// Write the wallet file, readable only by the owner on unix.
pub fn save_wallet(path: &Path, wallet: &WalletFile) -> Result<()> {
    let json = serde_json::to_string_pretty(wallet)?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("Error saving wallet: {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Read the wallet file.
pub fn load_wallet(path: &Path) -> Result<WalletFile> {
    if !path.exists() {
        bail!("No wallet found. Create one with: bloxer wallet create");
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Error loading wallet: {}", path.display()))?;
    serde_json::from_str(&contents).context("Wallet file is not valid JSON")
}

/// The wallet's address.
pub fn wallet_address(ctx: &Context) -> Result<Address> {
    Ok(Address::from(load_wallet(&ctx.wallet_path())?.address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(WALLET_FILE);
        let keypair = Keypair::generate().unwrap();

        save_wallet(&path, &WalletFile::from_keypair(&keypair)).unwrap();
        let loaded = load_wallet(&path).unwrap();

        assert_eq!(loaded.address, keypair.address().to_string());
        assert_eq!(loaded.keypair().unwrap().address(), keypair.address());
    }

    #[cfg(unix)]
    #[test]
    fn test_wallet_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(WALLET_FILE);
        let keypair = Keypair::generate().unwrap();
        save_wallet(&path, &WalletFile::from_keypair(&keypair)).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_missing_wallet() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_wallet(&dir.path().join(WALLET_FILE)).is_err());
    }

    #[test]
    fn test_mismatched_address_rejected() {
        let keypair = Keypair::generate().unwrap();
        let other = Keypair::generate().unwrap();
        let wallet = WalletFile {
            address: other.address().to_string(),
            private_key: hex::encode(keypair.private_key()),
        };
        assert!(wallet.keypair().is_err());
    }
}
