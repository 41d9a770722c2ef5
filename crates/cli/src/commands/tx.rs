//! Balance and transfer commands.

use super::wallet::{load_wallet, wallet_address};
use super::{abbreviate, load_ledger, save_ledger, Context};
use anyhow::{bail, Context as _, Result};
use bloxer_core::{Address, Transaction};
use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct BalanceArgs {
    /// Address to check (defaults to your wallet)
    address: Option<String>,
}

#[derive(Args)]
pub struct SendArgs {
    /// Recipient address
    #[arg(short, long)]
    to: String,

    /// Amount to send
    #[arg(short, long)]
    amount: f64,
}

pub fn balance(args: BalanceArgs, ctx: &Context) -> Result<()> {
    let address = match args.address {
        Some(a) => Address::from(a),
        None => wallet_address(ctx)?,
    };

    let storage = ctx.open_storage()?;
    let ledger = load_ledger(&storage)?;
    let balance = ledger.balance_of(&address);

    println!();
    println!("{}", "Balance".bold().cyan());
    println!();
    println!("  Address: {}", abbreviate(address.as_str()).bright_yellow());
    println!("  Balance: {}", format!("{:.2} coins", balance).green());
    println!();

    Ok(())
}

pub fn send(args: SendArgs, ctx: &Context) -> Result<()> {
    if args.to.is_empty() {
        bail!("Please specify recipient with --to");
    }
    if args.amount <= 0.0 || !args.amount.is_finite() {
        bail!("Please specify a positive amount with --amount");
    }

    let wallet = load_wallet(&ctx.wallet_path())?;
    let keypair = wallet.keypair()?;

    let storage = ctx.open_storage()?;
    let mut ledger = load_ledger(&storage)?;

    let tx = Transaction::new(keypair.address(), args.to.as_str(), args.amount)
        .signed(&keypair)
        .context("Failed to sign transaction")?;
    ledger.add_transaction(tx).context("Transaction failed")?;
    save_ledger(&storage, &ledger)?;

    println!();
    println!("{}  Transaction created!", "✓".green().bold());
    println!();
    println!("  From:    {}", abbreviate(&wallet.address).bright_yellow());
    println!("  To:      {}", abbreviate(&args.to).bright_yellow());
    println!("  Amount:  {}", format!("{:.2} coins", args.amount).bright_cyan());
    println!();
    println!(
        "  Transaction is pending. Run {} to include it in a block.",
        "bloxer mine".bright_cyan()
    );
    println!();

    Ok(())
}
