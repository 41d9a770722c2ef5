//! The ledger: chain of sealed blocks plus the pending pool.
//!
//! The ledger exclusively owns both collections. Mining appends to the chain
//! and replaces the pool in one `&mut self` call, so a caller that shares a
//! ledger across threads must wrap the whole value in a single lock.

use crate::mempool::Mempool;
use bloxer_core::hash::DIGEST_HEX_LEN;
use bloxer_core::{Address, Block, Digest, Payload, Transaction, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transaction must include a sender address")]
    EmptySender,

    #[error("transaction must include a recipient address")]
    EmptyRecipient,

    #[error("cannot add invalid transaction to chain: {0}")]
    Validation(#[from] ValidationError),

    #[error("ledger must contain at least the genesis block")]
    EmptyChain,

    #[error("invalid ledger configuration: {0}")]
    InvalidConfig(String),
}

/// The first integrity check a chain fails.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("block {height} carries invalid transactions: {source}")]
    Transactions {
        height: usize,
        #[source]
        source: ValidationError,
    },

    #[error("block {height} hash does not match its contents")]
    HashMismatch { height: usize },

    #[error("block {height} does not link to the previous block")]
    BrokenLink { height: usize },
}

impl IntegrityError {
    /// Index of the offending block.
    pub fn height(&self) -> usize {
        match self {
            IntegrityError::Transactions { height, .. }
            | IntegrityError::HashMismatch { height }
            | IntegrityError::BrokenLink { height } => *height,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Ledger parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Leading zero hex characters required of a mined block hash.
    pub difficulty: usize,
    /// Amount paid to the miner of each block.
    pub reward: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: 2,
            reward: 100.0,
        }
    }
}

impl LedgerConfig {
    /// Check the difficulty is in `1..=64` and the reward is a finite,
    /// non-negative amount.
    pub fn validate(&self) -> Result<()> {
        if self.difficulty == 0 || self.difficulty > DIGEST_HEX_LEN {
            return Err(LedgerError::InvalidConfig(format!(
                "difficulty must be between 1 and {}, got {}",
                DIGEST_HEX_LEN, self.difficulty
            )));
        }
        if !self.reward.is_finite() || self.reward < 0.0 {
            return Err(LedgerError::InvalidConfig(format!(
                "reward must be a non-negative amount, got {}",
                self.reward
            )));
        }
        Ok(())
    }
}

/// A single-writer proof-of-work ledger.
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Mempool,
    config: LedgerConfig,
}

impl Ledger {
    /// Create a ledger holding a fresh genesis block.
    pub fn new(difficulty: usize, reward: f64) -> Self {
        Self::with_config(LedgerConfig { difficulty, reward })
    }

    /// Create a ledger from a configuration.
    ///
    /// The configuration is taken as given; callers building it from user
    /// input run [`LedgerConfig::validate`] first.
    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            chain: vec![Block::genesis(Block::current_timestamp())],
            pending: Mempool::new(),
            config,
        }
    }

    /// Rebuild a persisted ledger. Blocks are taken as stored, hashes included.
    pub fn from_parts(
        chain: Vec<Block>,
        difficulty: usize,
        pending: Vec<Transaction>,
        reward: f64,
    ) -> Result<Self> {
        if chain.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        let config = LedgerConfig { difficulty, reward };
        config.validate()?;
        Ok(Self {
            chain,
            pending: Mempool::from_transactions(pending),
            config,
        })
    }

    /// All blocks, genesis first.
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Transactions waiting for the next block.
    pub fn pending(&self) -> &[Transaction] {
        self.pending.as_slice()
    }

    /// Required leading zero hex characters.
    pub fn difficulty(&self) -> usize {
        self.config.difficulty
    }

    /// Reward paid per mined block.
    pub fn reward(&self) -> f64 {
        self.config.reward
    }

    /// The ledger configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Index of the last block (0 for a genesis-only chain).
    pub fn height(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    /// The last block, or a zero-valued block if the chain is somehow empty.
    pub fn latest_block(&self) -> Block {
        self.chain.last().cloned().unwrap_or_default()
    }

    /// Hash of the last block.
    pub fn head_hash(&self) -> Digest {
        self.chain
            .last()
            .map(|b| b.hash().clone())
            .unwrap_or_default()
    }

    /// Admit a transaction into the pending pool.
    ///
    /// Both addresses must be non-empty, so reward transactions can never be
    /// submitted from outside. The pool is untouched on rejection.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<()> {
        if tx.from.is_empty() {
            warn!(to = %tx.to, "rejected transaction without sender");
            return Err(LedgerError::EmptySender);
        }
        if tx.to.is_empty() {
            warn!(from = %tx.from, "rejected transaction without recipient");
            return Err(LedgerError::EmptyRecipient);
        }
        if let Err(e) = tx.verify() {
            warn!(error = %e, "rejected invalid transaction");
            return Err(e.into());
        }

        info!(amount = tx.amount, pending = self.pending.len() + 1, "transaction admitted");
        self.pending.push(tx);
        Ok(())
    }

    /// Seal all pending transactions into a new block, stamped with the current time.
    pub fn mine_pending(&mut self, reward_address: impl Into<Address>) -> &Block {
        self.mine_pending_at(reward_address, Block::current_timestamp())
    }

    /// Seal all pending transactions into a new block with the given timestamp.
    ///
    /// Afterwards the pool holds exactly one reward transaction for
    /// `reward_address`; it lands in the chain with the next mined block.
    pub fn mine_pending_at(&mut self, reward_address: impl Into<Address>, timestamp: i64) -> &Block {
        let transactions = self.pending.take_all();
        let tx_count = transactions.len();

        let mut block = Block::new(timestamp, Payload::Transactions(transactions));
        block.link(self.head_hash().as_str());
        block.mine(self.config.difficulty);

        info!(
            height = self.chain.len(),
            hash = %block.hash(),
            nonce = block.nonce,
            transactions = tx_count,
            "block successfully mined"
        );

        self.chain.push(block);
        self.pending
            .replace(vec![Transaction::reward(reward_address, self.config.reward)]);

        &self.chain[self.chain.len() - 1]
    }

    /// Walk the chain from block 1 and return the first integrity failure.
    ///
    /// For each block: embedded transactions verify, the stored hash matches
    /// the recomputed one, and `prev_hash` matches the predecessor's stored
    /// hash. Genesis is not re-validated.
    pub fn validate_chain(&self) -> std::result::Result<(), IntegrityError> {
        for (height, pair) in self.chain.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let height = height + 1;

            current
                .verify_transactions()
                .map_err(|source| IntegrityError::Transactions { height, source })?;

            if !current.is_self_consistent() {
                return Err(IntegrityError::HashMismatch { height });
            }

            if current.prev_hash != previous.hash().as_str() {
                return Err(IntegrityError::BrokenLink { height });
            }
        }
        Ok(())
    }

    /// Boolean form of [`Ledger::validate_chain`].
    pub fn is_chain_valid(&self) -> bool {
        match self.validate_chain() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "chain integrity check failed");
                false
            }
        }
    }

    /// Sum of mined credits minus debits for `address`. Pending is ignored.
    pub fn balance_of(&self, address: impl AsRef<str>) -> f64 {
        let address = address.as_ref();
        let mut balance = 0.0;

        for tx in self.chain.iter().flat_map(Block::transactions) {
            if tx.from.as_str() == address {
                balance -= tx.amount;
            }
            if tx.to.as_str() == address {
                balance += tx.amount;
            }
        }

        balance
    }

    /// Get ledger statistics.
    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            height: self.height(),
            latest_block_hash: self.head_hash(),
            latest_timestamp: self.chain.last().map(|b| b.timestamp).unwrap_or_default(),
            pending_transactions: self.pending.len(),
            difficulty: self.config.difficulty,
        }
    }
}

/// Ledger statistics.
#[derive(Debug, Clone)]
pub struct LedgerStats {
    /// Index of the last block.
    pub height: usize,
    /// Hash of the latest block.
    pub latest_block_hash: Digest,
    /// Timestamp of the latest block.
    pub latest_timestamp: i64,
    /// Number of pending transactions.
    pub pending_transactions: usize,
    /// Current mining difficulty.
    pub difficulty: usize,
}
