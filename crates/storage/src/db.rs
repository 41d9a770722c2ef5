//! sled database wrapper with serialization helpers.

use sled::Db;
use std::path::Path;
use thiserror::Error;

/// Storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Corrupt ledger data: {0}")]
    Corrupt(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] bloxer_chain::LedgerError),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Wrapper around sled database with serialization helpers.
pub struct Storage {
    db: Db,
}

impl Storage {
    /// Open a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Open an in-memory database (for testing).
    #[cfg(test)]
    pub(crate) fn open_temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Retrieve and deserialize a value.
    pub fn get<K, V>(&self, key: K) -> Result<Option<V>>
    where
        K: AsRef<[u8]>,
        V: serde::de::DeserializeOwned,
    {
        match self.db.get(key)? {
            Some(bytes) => {
                let value = bincode::deserialize(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Retrieve a value, returning error if not found.
    pub fn get_or_err<K, V>(&self, key: K) -> Result<V>
    where
        K: AsRef<[u8]> + std::fmt::Debug + Clone,
        V: serde::de::DeserializeOwned,
    {
        self.get(key.clone())?
            .ok_or_else(|| StorageError::NotFound(format!("{:?}", key)))
    }

    /// Check if a key exists.
    pub fn contains<K: AsRef<[u8]>>(&self, key: K) -> Result<bool> {
        Ok(self.db.contains_key(key)?)
    }

    /// Apply multiple operations atomically.
    ///
    /// Operations are collected first, then written in one sled batch.
    pub fn batch(&self, operations: Vec<BatchOp>) -> Result<()> {
        let mut batch = sled::Batch::default();
        for op in operations {
            match op {
                BatchOp::Insert { key, value } => batch.insert(key, value),
                BatchOp::Remove { key } => batch.remove(key),
            }
        }
        self.db.apply_batch(batch)?;
        Ok(())
    }

    /// Remove every key.
    pub fn clear(&self) -> Result<()> {
        self.db.clear()?;
        Ok(())
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    // =========================================================================
    // Key Construction Helpers
    // =========================================================================

    /// Create a prefixed key for blocks by height.
    /// Format: "block:height:{height}"
    pub fn block_height_key(height: u64) -> Vec<u8> {
        format!("block:height:{}", height).into_bytes()
    }
}

/// Batch operation for atomic updates.
pub enum BatchOp {
    Insert { key: Vec<u8>, value: Vec<u8> },
    Remove { key: Vec<u8> },
}

impl BatchOp {
    /// Encode `value` and insert it under `key`.
    pub fn put<K, V>(key: K, value: &V) -> Result<Self>
    where
        K: Into<Vec<u8>>,
        V: serde::Serialize,
    {
        Ok(BatchOp::Insert {
            key: key.into(),
            value: bincode::serialize(value)?,
        })
    }
}
