//! Core ledger primitives for bloxer.
//!
//! This crate provides the fundamental types used throughout the ledger:
//! - SHA-256 hashing and the difficulty check
//! - P-256 keypairs, addresses and DER signatures
//! - Transactions (hashing, signing, verification)
//! - Blocks (canonical hashing, linking, proof-of-work)

pub mod block;
pub mod crypto;
pub mod hash;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::{Block, Payload, GENESIS_MESSAGE, GENESIS_PREV_HASH};
pub use crypto::{Address, CryptoError, Keypair, Signature};
pub use hash::{meets_difficulty, sha256, sha256_concat, Digest};
pub use transaction::{canonical_amount, Transaction, TransactionError, ValidationError};
