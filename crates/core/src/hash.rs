//! SHA-256 hashing utilities for the ledger.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// Length of a rendered digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// A lowercase hex-rendered SHA-256 digest.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Get the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode into the raw 32 digest bytes.
    pub fn to_bytes(&self) -> Result<[u8; 32], hex::FromHexError> {
        let bytes = hex::decode(&self.0)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(arr)
    }

    /// True when the first `difficulty` hex characters are all `'0'`.
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        meets_difficulty(&self.0, difficulty)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "Digest({})", prefix)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Digest {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Digest {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Hash arbitrary data with SHA-256.
pub fn sha256(data: &[u8]) -> Digest {
    Digest(hex::encode(Sha256::digest(data)))
}

/// Hash multiple pieces of data by concatenating them.
pub fn sha256_concat(parts: &[&[u8]]) -> Digest {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    Digest(hex::encode(hasher.finalize()))
}

/// Check a hex string for `difficulty` leading zero characters.
pub fn meets_difficulty(hex: &str, difficulty: usize) -> bool {
    hex.len() >= difficulty && hex.bytes().take(difficulty).all(|b| b == b'0')
}
