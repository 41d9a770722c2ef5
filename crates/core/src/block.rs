//! Blocks and proof-of-work sealing.

use crate::hash::{sha256, Digest};
use crate::transaction::{Transaction, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Message carried by every genesis block.
pub const GENESIS_MESSAGE: &str = "Genesis Block";

/// `prev_hash` of the genesis block.
pub const GENESIS_PREV_HASH: &str = "0";

/// What a block carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// Sentinel payload of the first block.
    Genesis { message: String },
    /// An ordered batch of transactions.
    Transactions(Vec<Transaction>),
}

impl Payload {
    /// The transaction batch, if this payload carries one.
    pub fn transactions(&self) -> Option<&[Transaction]> {
        match self {
            Payload::Transactions(txs) => Some(txs),
            Payload::Genesis { .. } => None,
        }
    }

    /// Mutable access to the transaction batch.
    pub fn transactions_mut(&mut self) -> Option<&mut Vec<Transaction>> {
        match self {
            Payload::Transactions(txs) => Some(txs),
            Payload::Genesis { .. } => None,
        }
    }

    /// Canonical structured form, keyed by variant.
    pub fn canonical_value(&self) -> Value {
        match self {
            Payload::Genesis { message } => json!({ "genesis": { "message": message } }),
            Payload::Transactions(txs) => {
                let txs: Vec<Value> = txs.iter().map(Transaction::canonical_value).collect();
                json!({ "transactions": txs })
            }
        }
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Transactions(Vec::new())
    }
}

/// A block in the chain.
///
/// `hash` is cached: it is recomputed by every constructor and by
/// [`Block::link`], [`Block::seal`] and [`Block::mine`]. Editing the public
/// fields directly leaves it stale, which [`Block::is_self_consistent`]
/// reports.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// Genesis message or transaction batch.
    pub payload: Payload,
    /// Hash of the previous block.
    pub prev_hash: String,
    /// Proof-of-work nonce.
    pub nonce: u64,
    hash: Digest,
}

impl Block {
    /// Create a new unlinked block with `nonce = 0` and an empty `prev_hash`.
    pub fn new(timestamp: i64, payload: Payload) -> Self {
        let mut block = Self {
            timestamp,
            payload,
            prev_hash: String::new(),
            nonce: 0,
            hash: Digest::default(),
        };
        block.seal();
        block
    }

    /// Create the genesis block.
    pub fn genesis(timestamp: i64) -> Self {
        let mut block = Self::new(
            timestamp,
            Payload::Genesis {
                message: GENESIS_MESSAGE.to_string(),
            },
        );
        block.link(GENESIS_PREV_HASH);
        block
    }

    /// The cached block hash.
    pub fn hash(&self) -> &Digest {
        &self.hash
    }

    /// Compute the digest of `(timestamp, payload, prev_hash, nonce)`.
    pub fn calculate_hash(&self) -> Digest {
        let preimage = json!({
            "nonce": self.nonce,
            "payload": self.payload.canonical_value(),
            "prev_hash": self.prev_hash,
            "timestamp": self.timestamp,
        });
        sha256(preimage.to_string().as_bytes())
    }

    /// Recompute and store the hash.
    pub fn seal(&mut self) {
        self.hash = self.calculate_hash();
    }

    /// Set the predecessor hash and reseal.
    pub fn link(&mut self, prev_hash: impl Into<String>) {
        self.prev_hash = prev_hash.into();
        self.seal();
    }

    /// Proof-of-work: bump the nonce until the hash has `difficulty`
    /// leading zero hex characters.
    pub fn mine(&mut self, difficulty: usize) {
        while !self.hash.meets_difficulty(difficulty) {
            self.nonce += 1;
            self.seal();
        }
        debug!(nonce = self.nonce, hash = %self.hash, "block mined");
    }

    /// Check if this is a genesis block.
    pub fn is_genesis(&self) -> bool {
        self.prev_hash == GENESIS_PREV_HASH && matches!(self.payload, Payload::Genesis { .. })
    }

    /// True when the cached hash matches the block's own fields.
    pub fn is_self_consistent(&self) -> bool {
        self.hash == self.calculate_hash()
    }

    /// Transactions in this block (empty for genesis).
    pub fn transactions(&self) -> &[Transaction] {
        self.payload.transactions().unwrap_or(&[])
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions().len()
    }

    /// Verify every embedded transaction.
    pub fn verify_transactions(&self) -> Result<(), ValidationError> {
        let txs = self
            .payload
            .transactions()
            .ok_or(ValidationError::NotTransactionBatch)?;

        for (index, tx) in txs.iter().enumerate() {
            tx.verify().map_err(|source| ValidationError::Transaction {
                index,
                source: Box::new(source),
            })?;
        }
        Ok(())
    }

    /// Get the current Unix timestamp.
    pub fn current_timestamp() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    fn signed_batch() -> Vec<Transaction> {
        let kp = Keypair::generate().unwrap();
        vec![
            Transaction::new(kp.address(), "bob", 1.0).signed(&kp).unwrap(),
            Transaction::reward("miner", 100.0),
        ]
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis(1_700_000_000);

        assert!(genesis.is_genesis());
        assert_eq!(genesis.prev_hash, GENESIS_PREV_HASH);
        assert_eq!(genesis.nonce, 0);
        assert_eq!(genesis.tx_count(), 0);
        assert!(genesis.is_self_consistent());
    }

    #[test]
    fn test_new_block_hash_computed() {
        let block = Block::new(10, Payload::Transactions(vec![]));
        assert_eq!(block.prev_hash, "");
        assert_eq!(block.nonce, 0);
        assert_eq!(block.hash(), &block.calculate_hash());
    }

    #[test]
    fn test_block_hash_deterministic() {
        let a = Block::new(42, Payload::Transactions(signed_batch()));
        let b = a.clone();
        assert_eq!(a.calculate_hash(), b.calculate_hash());
        assert_eq!(a.calculate_hash(), a.calculate_hash());
    }

    #[test]
    fn test_canonical_preimage_layout() {
        let block = Block::genesis(5);
        let expected = sha256(
            br#"{"nonce":0,"payload":{"genesis":{"message":"Genesis Block"}},"prev_hash":"0","timestamp":5}"#,
        );
        assert_eq!(block.hash(), &expected);
    }

    #[test]
    fn test_link_reseals() {
        let mut block = Block::new(10, Payload::Transactions(vec![]));
        let before = block.hash().clone();
        block.link("abc");
        assert_ne!(block.hash(), &before);
        assert!(block.is_self_consistent());
    }

    #[test]
    fn test_field_mutation_breaks_consistency() {
        let mut block = Block::new(10, Payload::Transactions(signed_batch()));
        block.payload.transactions_mut().unwrap()[1].amount = 1_000.0;
        assert!(!block.is_self_consistent());
        block.seal();
        assert!(block.is_self_consistent());
    }

    #[test]
    fn test_mine_meets_difficulty() {
        let mut block = Block::new(10, Payload::Transactions(vec![]));
        block.link("0000abc");
        block.mine(2);

        assert!(block.hash().as_str().starts_with("00"));
        assert!(block.is_self_consistent());
    }

    #[test]
    fn test_mine_zero_difficulty_is_noop() {
        let mut block = Block::new(10, Payload::Transactions(vec![]));
        block.mine(0);
        assert_eq!(block.nonce, 0);
    }

    #[test]
    fn test_verify_transactions() {
        let block = Block::new(10, Payload::Transactions(signed_batch()));
        assert!(block.verify_transactions().is_ok());
    }

    #[test]
    fn test_verify_transactions_rejects_genesis() {
        let genesis = Block::genesis(10);
        assert!(matches!(
            genesis.verify_transactions(),
            Err(ValidationError::NotTransactionBatch)
        ));
    }

    #[test]
    fn test_verify_transactions_reports_index() {
        let kp = Keypair::generate().unwrap();
        let txs = vec![
            Transaction::reward("miner", 100.0),
            Transaction::new(kp.address(), "bob", 1.0),
        ];
        let block = Block::new(10, Payload::Transactions(txs));

        match block.verify_transactions() {
            Err(ValidationError::Transaction { index, source }) => {
                assert_eq!(index, 1);
                assert!(matches!(*source, ValidationError::MissingSignature));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_serde_keeps_stored_hash() {
        let mut block = Block::new(10, Payload::Transactions(signed_batch()));
        block.link("prev");
        block.mine(1);

        let encoded = bincode::serialize(&block).unwrap();
        let decoded: Block = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, block);
        assert!(decoded.is_self_consistent());
    }
}
