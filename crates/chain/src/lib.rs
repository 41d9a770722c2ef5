//! Ledger orchestration for bloxer.
//!
//! This crate ties the core primitives into a working single-node ledger:
//! - **Ledger**: the chain of sealed blocks, admission, mining, validation
//!   and balance accounting
//! - **Mempool**: FIFO pool of transactions waiting for the next block
//!
//! # Example
//!
//! ```rust,no_run
//! use bloxer_chain::Ledger;
//! use bloxer_core::{Keypair, Transaction};
//!
//! let mut ledger = Ledger::new(2, 100.0);
//! let alice = Keypair::generate().unwrap();
//!
//! let tx = Transaction::new(alice.address(), "bob", 10.0)
//!     .signed(&alice)
//!     .unwrap();
//! ledger.add_transaction(tx).unwrap();
//!
//! ledger.mine_pending(alice.address());
//! assert!(ledger.is_chain_valid());
//! ```

pub mod ledger;
pub mod mempool;

// Re-export commonly used types
pub use ledger::{IntegrityError, Ledger, LedgerConfig, LedgerError, LedgerStats};
pub use mempool::Mempool;
