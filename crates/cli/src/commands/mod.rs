//! CLI commands module.

use anyhow::{Context as _, Result};
use bloxer_chain::{Ledger, LedgerConfig};
use bloxer_storage::{LedgerStore, Storage};
use clap::Subcommand;
use std::path::{Path, PathBuf};

mod block;
mod init;
mod reset;
mod tx;
mod wallet;

/// Name of the data directory under the user's home.
const DATA_DIR_NAME: &str = ".bloxer";

/// Subdirectory holding the sled ledger database.
const LEDGER_DIR_NAME: &str = "ledger";

#[derive(Subcommand)]
pub enum Commands {
    /// Create a fresh ledger with custom parameters
    Init(init::InitArgs),
    /// Manage your wallet
    Wallet(wallet::WalletArgs),
    /// Check the balance of your wallet or any address
    Balance(tx::BalanceArgs),
    /// Create and sign a transaction to send coins
    Send(tx::SendArgs),
    /// Mine pending transactions and receive a reward
    Mine,
    /// Display all blocks in the chain
    Chain,
    /// Check that the chain hasn't been tampered with
    Validate,
    /// Delete ledger data and start fresh
    Reset(reset::ResetArgs),
}

pub fn run(cmd: Commands, ctx: &Context) -> Result<()> {
    match cmd {
        Commands::Init(args) => init::run(args, ctx),
        Commands::Wallet(args) => wallet::run(args, ctx),
        Commands::Balance(args) => tx::balance(args, ctx),
        Commands::Send(args) => tx::send(args, ctx),
        Commands::Mine => block::mine(ctx),
        Commands::Chain => block::show_chain(ctx),
        Commands::Validate => block::validate(ctx),
        Commands::Reset(args) => reset::run(args, ctx),
    }
}

/// Paths shared by every command.
pub struct Context {
    data_dir: PathBuf,
}

impl Context {
    /// Resolve the data directory, falling back to `~/.bloxer`.
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .context("Could not determine home directory; pass --data-dir")?
                .join(DATA_DIR_NAME),
        };
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn ledger_dir(&self) -> PathBuf {
        self.data_dir.join(LEDGER_DIR_NAME)
    }

    pub fn wallet_path(&self) -> PathBuf {
        self.data_dir.join(wallet::WALLET_FILE)
    }

    /// Open the ledger database, creating the data directory if needed.
    pub fn open_storage(&self) -> Result<Storage> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        Storage::open(self.ledger_dir()).with_context(|| "Failed to open ledger storage")
    }
}

/// Load the saved ledger, creating a default one on first use.
pub(crate) fn load_ledger(storage: &Storage) -> Result<Ledger> {
    LedgerStore::new(storage)
        .load_or_create(LedgerConfig::default())
        .context("Failed to load ledger")
}

/// Persist the ledger.
pub(crate) fn save_ledger(storage: &Storage, ledger: &Ledger) -> Result<()> {
    LedgerStore::new(storage)
        .save(ledger)
        .context("Failed to save ledger")
}

/// Shorten long hex values to `first10...last10`.
pub(crate) fn abbreviate(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 20 {
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 10..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("short"), "short");
        let long = "0123456789abcdefghijklmnopqrstuvwxyz";
        assert_eq!(abbreviate(long), "0123456789...qrstuvwxyz");
    }

    #[test]
    fn test_context_paths() {
        let ctx = Context::new(Some(PathBuf::from("/tmp/bloxer-test"))).unwrap();
        assert_eq!(ctx.ledger_dir(), PathBuf::from("/tmp/bloxer-test/ledger"));
        assert_eq!(ctx.wallet_path(), PathBuf::from("/tmp/bloxer-test/wallet.json"));
    }

    #[test]
    fn test_ledger_created_on_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(Some(dir.path().to_path_buf())).unwrap();

        let storage = ctx.open_storage().unwrap();
        let ledger = load_ledger(&storage).unwrap();
        assert_eq!(ledger.height(), 0);
        assert_eq!(ledger.difficulty(), 2);
        assert!(LedgerStore::new(&storage).exists().unwrap());
    }
}
