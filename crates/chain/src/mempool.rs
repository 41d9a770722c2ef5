//! Pending transaction pool.
//!
//! Transactions wait here, in submission order, until the next block is
//! mined. Order is preserved into the block.

use bloxer_core::Transaction;
use serde::{Deserialize, Serialize};

/// FIFO pool of transactions awaiting a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mempool {
    transactions: Vec<Transaction>,
}

impl Mempool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from already-ordered transactions.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// Get the number of transactions in the pool.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Append a transaction at the back of the queue.
    pub fn push(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// The queued transactions as a slice.
    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Drain the whole queue, leaving it empty.
    pub fn take_all(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }

    /// Replace the queue contents.
    pub fn replace(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }
}
