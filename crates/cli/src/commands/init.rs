//! Initialize ledger command.

use super::Context;
use anyhow::{bail, Context as _, Result};
use bloxer_chain::{Ledger, LedgerConfig};
use bloxer_storage::LedgerStore;
use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct InitArgs {
    /// Leading zero hex characters required of each block hash
    #[arg(short, long, default_value = "2")]
    difficulty: usize,

    /// Coins paid to the miner of each block
    #[arg(short, long, default_value = "100")]
    reward: f64,

    /// Replace an existing ledger
    #[arg(short, long)]
    force: bool,
}

pub fn run(args: InitArgs, ctx: &Context) -> Result<()> {
    let config = LedgerConfig {
        difficulty: args.difficulty,
        reward: args.reward,
    };
    config.validate()?;

    println!("{}", "Initializing bloxer...".bold().cyan());
    println!();

    let storage = ctx.open_storage()?;
    let store = LedgerStore::new(&storage);

    if store.exists()? {
        if !args.force {
            bail!(
                "A ledger already exists in {}. Use --force or {} to replace it.",
                ctx.data_dir().display(),
                "bloxer reset".bright_cyan()
            );
        }
        store.reset().context("Failed to remove existing ledger")?;
    }

    let ledger = Ledger::with_config(config);
    store.save(&ledger).context("Failed to save ledger")?;

    let genesis = ledger.latest_block();
    println!("{}  Created genesis block", "✓".green().bold());
    println!("    Hash:       {}", genesis.hash().as_str().bright_yellow());
    println!("    Difficulty: {}", args.difficulty.to_string().bright_cyan());
    println!("    Reward:     {}", format!("{:.2}", args.reward).bright_cyan());
    println!();
    println!("Next steps:");
    println!("  • Use {} to create a wallet", "bloxer wallet create".bright_cyan());
    println!("  • Use {} to mine your first block", "bloxer mine".bright_cyan());

    Ok(())
}
