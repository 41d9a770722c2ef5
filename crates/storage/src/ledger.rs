//! Ledger persistence.
//!
//! Every field of the ledger is stored as-is, including cached block hashes,
//! DER signatures and the empty sender of reward transactions, so a reloaded
//! ledger validates exactly like the one that was saved.

use crate::db::{BatchOp, Result, Storage, StorageError};
use bloxer_chain::{Ledger, LedgerConfig};
use bloxer_core::{Block, Transaction};
use tracing::debug;

/// Keys for ledger metadata.
const LEDGER_META_KEY: &[u8] = b"ledger:meta";
const LEDGER_PENDING_KEY: &[u8] = b"ledger:pending";
const CHAIN_HEIGHT_KEY: &[u8] = b"chain:height";

/// Saves and reloads a [`Ledger`].
pub struct LedgerStore<'a> {
    storage: &'a Storage,
}

impl<'a> LedgerStore<'a> {
    /// Create a new LedgerStore wrapping the given storage.
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Check if a ledger has been saved.
    pub fn exists(&self) -> Result<bool> {
        self.storage.contains(CHAIN_HEIGHT_KEY)
    }

    /// Get the stored chain height, if any.
    pub fn get_height(&self) -> Result<Option<u64>> {
        self.storage.get(CHAIN_HEIGHT_KEY)
    }

    /// Get a stored block by its height.
    pub fn get_block_by_height(&self, height: u64) -> Result<Option<Block>> {
        self.storage.get(Storage::block_height_key(height))
    }

    /// Write the whole ledger in one atomic batch.
    ///
    /// Block records beyond the new height (left over from a longer ledger)
    /// are removed in the same batch.
    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        let new_height = ledger.height() as u64;
        let old_height = self.get_height()?;

        let mut ops = Vec::with_capacity(ledger.chain().len() + 3);
        for (height, block) in ledger.chain().iter().enumerate() {
            ops.push(BatchOp::put(Storage::block_height_key(height as u64), block)?);
        }
        if let Some(old) = old_height {
            for height in (new_height + 1)..=old {
                ops.push(BatchOp::Remove {
                    key: Storage::block_height_key(height),
                });
            }
        }
        ops.push(BatchOp::put(LEDGER_META_KEY, ledger.config())?);
        ops.push(BatchOp::put(LEDGER_PENDING_KEY, &ledger.pending().to_vec())?);
        ops.push(BatchOp::put(CHAIN_HEIGHT_KEY, &new_height)?);

        self.storage.batch(ops)?;
        self.storage.flush()?;

        debug!(height = new_height, pending = ledger.pending().len(), "ledger saved");
        Ok(())
    }

    /// Reload the saved ledger, or `None` if nothing has been saved yet.
    pub fn load(&self) -> Result<Option<Ledger>> {
        let height = match self.get_height()? {
            Some(h) => h,
            None => return Ok(None),
        };

        let config: LedgerConfig = self.storage.get_or_err(LEDGER_META_KEY)?;
        let pending: Vec<Transaction> = self
            .storage
            .get(LEDGER_PENDING_KEY)?
            .ok_or_else(|| StorageError::Corrupt("missing pending transactions".to_string()))?;

        let mut chain = Vec::with_capacity(height as usize + 1);
        for h in 0..=height {
            let block = self
                .get_block_by_height(h)?
                .ok_or_else(|| StorageError::Corrupt(format!("missing block at height {}", h)))?;
            chain.push(block);
        }

        let ledger = Ledger::from_parts(chain, config.difficulty, pending, config.reward)?;
        debug!(height, "ledger loaded");
        Ok(Some(ledger))
    }

    /// Load the saved ledger, or create and save one from `config`.
    pub fn load_or_create(&self, config: LedgerConfig) -> Result<Ledger> {
        if let Some(ledger) = self.load()? {
            return Ok(ledger);
        }
        let ledger = Ledger::with_config(config);
        self.save(&ledger)?;
        Ok(ledger)
    }

    /// Delete every ledger record.
    pub fn reset(&self) -> Result<()> {
        self.storage.clear()?;
        self.storage.flush()
    }
}
