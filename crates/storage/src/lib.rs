//! Persistent storage layer for bloxer.
//!
//! This crate saves a [`bloxer_chain::Ledger`] to disk and reloads it:
//! - Blocks (by height, hashes and signatures stored verbatim)
//! - Pending transactions, including the queued mining reward
//! - Ledger parameters (difficulty, reward)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                     │
//! │                  (CLI, Ledger operations)                │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────────┐
//! │                   Storage Layer                          │
//! │  ┌──────────────────────┐  ┌──────────────────────────┐  │
//! │  │ LedgerStore          │  │ Storage (DB)             │  │
//! │  │  - Blocks by height  │  │  - sled wrapper          │  │
//! │  │  - Pending pool      │  │  - bincode serialization │  │
//! │  │  - Difficulty/reward │  │  - atomic batches        │  │
//! │  └──────────────────────┘  └──────────────────────────┘  │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────────┐
//! │                    sled Database                         │
//! │              (Embedded Key-Value Store)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use bloxer_chain::LedgerConfig;
//! use bloxer_storage::{LedgerStore, Storage};
//!
//! let storage = Storage::open("./ledger_data").unwrap();
//! let store = LedgerStore::new(&storage);
//!
//! let mut ledger = store.load_or_create(LedgerConfig::default()).unwrap();
//! ledger.mine_pending("miner");
//! store.save(&ledger).unwrap();
//! ```

pub mod db;
pub mod ledger;

// Re-export commonly used types
pub use db::{BatchOp, Result, Storage, StorageError};
pub use ledger::LedgerStore;
