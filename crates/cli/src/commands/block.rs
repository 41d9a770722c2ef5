//! Mining, chain display and validation commands.

use super::wallet::wallet_address;
use super::{abbreviate, load_ledger, save_ledger, Context};
use anyhow::Result;
use bloxer_core::{Block, Payload};
use colored::Colorize;
use std::time::Instant;

pub fn mine(ctx: &Context) -> Result<()> {
    let address = wallet_address(ctx)?;

    let storage = ctx.open_storage()?;
    let mut ledger = load_ledger(&storage)?;

    println!();
    println!("{}", "Mining block...".yellow().bold());
    println!();
    println!("  Difficulty: {}", ledger.difficulty());
    println!("  Pending transactions: {}", ledger.pending().len());

    let started = Instant::now();
    let hash = ledger.mine_pending(address.clone()).hash().clone();
    let elapsed = started.elapsed();

    save_ledger(&storage, &ledger)?;

    println!();
    println!("{}  Block mined successfully!", "✓".green().bold());
    println!();
    println!("  Hash:        {}", abbreviate(hash.as_str()).bright_yellow());
    println!("  Time taken:  {} ms", elapsed.as_millis());
    println!("  Reward:      {:.2} coins", ledger.reward());
    println!(
        "  New balance: {}",
        format!("{:.2} coins", ledger.balance_of(&address)).green()
    );
    println!();

    Ok(())
}

pub fn show_chain(ctx: &Context) -> Result<()> {
    let storage = ctx.open_storage()?;
    let ledger = load_ledger(&storage)?;

    let stats = ledger.stats();

    println!();
    println!("{}", "Blockchain".bold().cyan());
    println!("  Total blocks: {}", stats.height + 1);
    println!("  Difficulty:   {}", stats.difficulty);
    println!("  Head:         {}", abbreviate(stats.latest_block_hash.as_str()).bright_yellow());
    println!("  Last mined:   {}", stats.latest_timestamp);
    println!();

    for (height, block) in ledger.chain().iter().enumerate() {
        print_block(height, block);
    }

    if stats.pending_transactions > 0 {
        println!(
            "  {}",
            format!("Pending Transactions: {}", stats.pending_transactions)
                .yellow()
                .bold()
        );
        println!();
    }

    Ok(())
}

fn print_block(height: usize, block: &Block) {
    println!("  {}", format!("Block #{}", height).blue().bold());
    println!("    Hash:      {}", abbreviate(block.hash().as_str()).bright_yellow());
    println!("    Prev:      {}", abbreviate(&block.prev_hash).bright_black());
    println!("    Timestamp: {}", block.timestamp.to_string().bright_black());
    println!("    Nonce:     {}", block.nonce.to_string().bright_cyan());

    match &block.payload {
        Payload::Genesis { message } => {
            println!("    Message:   {}", message);
        }
        Payload::Transactions(txs) if !txs.is_empty() => {
            println!("    Transactions:");
            for tx in txs {
                let from = if tx.is_reward() {
                    "MINING REWARD".green().to_string()
                } else {
                    abbreviate(tx.from.as_str())
                };
                println!(
                    "      {} -> {}: {:.2}",
                    from,
                    abbreviate(tx.to.as_str()),
                    tx.amount
                );
            }
        }
        Payload::Transactions(_) => {}
    }
    println!();
}

pub fn validate(ctx: &Context) -> Result<()> {
    let storage = ctx.open_storage()?;
    let ledger = load_ledger(&storage)?;

    println!();
    println!("{}", "Validating blockchain...".bold().cyan());
    println!();

    match ledger.validate_chain() {
        Ok(()) => {
            println!("  {}  Blockchain is valid!", "✓".green().bold());
            println!();
            Ok(())
        }
        Err(e) => {
            println!("  {}  Blockchain is INVALID!", "✗".red().bold());
            println!("  {}", e.to_string().red());
            println!("  The chain may have been tampered with.");
            println!();
            anyhow::bail!("chain validation failed at block {}", e.height())
        }
    }
}
