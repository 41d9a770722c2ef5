//! bloxer CLI entry point.

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

mod commands;

#[derive(Parser)]
#[command(name = "bloxer")]
#[command(about = "An educational proof-of-work ledger", long_about = None)]
struct Cli {
    /// Directory holding the ledger and wallet (default: ~/.bloxer)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<commands::Commands>,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => {
            let ctx = match commands::Context::new(cli.data_dir) {
                Ok(ctx) => ctx,
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = commands::run(cmd, &ctx) {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("bloxer - An educational proof-of-work ledger");
            println!("Run 'bloxer --help' for usage information.");
        }
    }
}
