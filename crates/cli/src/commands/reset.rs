//! Reset command.

use super::Context;
use anyhow::{Context as _, Result};
use bloxer_storage::LedgerStore;
use clap::Args;
use colored::Colorize;
use std::fs;

#[derive(Args)]
pub struct ResetArgs {
    /// Also delete the wallet
    #[arg(short, long)]
    all: bool,
}

pub fn run(args: ResetArgs, ctx: &Context) -> Result<()> {
    if ctx.ledger_dir().exists() {
        let storage = ctx.open_storage()?;
        LedgerStore::new(&storage)
            .reset()
            .context("Error resetting blockchain")?;
    }

    println!();
    println!("{}  Blockchain reset successfully!", "✓".green().bold());

    if args.all {
        let wallet = ctx.wallet_path();
        if wallet.exists() {
            fs::remove_file(&wallet).context("Error deleting wallet")?;
        }
        println!("{}  Wallet deleted!", "✓".green().bold());
    }

    println!();
    println!("  A new genesis block will be created on next operation.");
    println!();
    Ok(())
}
