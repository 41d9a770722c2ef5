//! ECDSA P-256 primitives for signing and verification.
//!
//! Addresses are the SEC1 *uncompressed* encoding of a public key
//! (`0x04 || X || Y`, 65 bytes) rendered as lowercase hex. That single
//! encoding is used both for displaying wallet addresses and for recovering
//! the verifying key from a transaction's `from` field.

use crate::hash::Digest;
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use p256::FieldBytes;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Length of an uncompressed SEC1 P-256 point.
pub const UNCOMPRESSED_POINT_LEN: usize = 65;

/// SEC1 tag byte for an uncompressed point.
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("entropy source failed: {0}")]
    Entropy(String),
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("malformed address: {0}")]
    MalformedAddress(String),
    #[error("signing failed: {0}")]
    Signing(String),
}

/// An address on the ledger: hex of an uncompressed public key point.
///
/// The empty address marks the sender of a reward transaction.
#[derive(Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// The empty address used as the sender of reward transactions.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Derive the address of a public key.
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        Self(hex::encode(point.as_bytes()))
    }

    /// Check if this is the empty (reward) address.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the address back into a verifying key.
    ///
    /// Only the 65-byte uncompressed form is accepted.
    pub fn to_public_key(&self) -> Result<VerifyingKey, CryptoError> {
        let bytes = hex::decode(&self.0)
            .map_err(|e| CryptoError::MalformedAddress(format!("not hex: {}", e)))?;
        if bytes.len() != UNCOMPRESSED_POINT_LEN || bytes[0] != UNCOMPRESSED_TAG {
            return Err(CryptoError::MalformedAddress(format!(
                "expected {} byte uncompressed point, got {} bytes",
                UNCOMPRESSED_POINT_LEN,
                bytes.len()
            )));
        }
        VerifyingKey::from_sec1_bytes(&bytes)
            .map_err(|_| CryptoError::MalformedAddress("point is not on the curve".into()))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A DER-encoded ECDSA signature.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

impl Signature {
    /// Create a signature from raw DER bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(s)?))
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        let end = hex.len().min(16);
        write!(f, "Signature({}...)", &hex[..end])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Verify a DER signature over a 32-byte digest.
///
/// Returns false for unparseable signatures as well as mismatches.
pub fn verify_digest(key: &VerifyingKey, digest: &[u8; 32], signature: &Signature) -> bool {
    match EcdsaSignature::from_der(signature.as_bytes()) {
        Ok(sig) => key.verify_prehash(digest, &sig).is_ok(),
        Err(_) => false,
    }
}

/// A P-256 keypair for signing.
pub struct Keypair {
    signing_key: SigningKey,
    pub public_key: VerifyingKey,
}

impl Keypair {
    /// Generate a new random keypair from the operating system's CSPRNG.
    pub fn generate() -> Result<Self, CryptoError> {
        Self::generate_with(&mut OsRng)
    }

    /// Generate a new random keypair from the given randomness source.
    ///
    /// Scalars outside the curve order are rejected and redrawn.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, CryptoError> {
        loop {
            let mut bytes = FieldBytes::default();
            rng.try_fill_bytes(bytes.as_mut_slice())
                .map_err(|e| CryptoError::Entropy(e.to_string()))?;
            if let Ok(signing_key) = SigningKey::from_bytes(&bytes) {
                return Ok(Self::from_signing_key(signing_key));
            }
        }
    }

    /// Create a keypair from a private key (32-byte big-endian scalar).
    pub fn from_private_key(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_bytes(FieldBytes::from_slice(bytes))
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = VerifyingKey::from(&signing_key);
        Self {
            signing_key,
            public_key,
        }
    }

    /// Get the private key bytes.
    pub fn private_key(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.signing_key.to_bytes());
        out
    }

    /// Get the address derived from the public key.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    /// Sign a digest directly (no further hashing).
    pub fn sign_digest(&self, digest: &Digest) -> Result<Signature, CryptoError> {
        let bytes = digest
            .to_bytes()
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        let sig: EcdsaSignature = self
            .signing_key
            .sign_prehash(&bytes)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        Ok(Signature(sig.to_der().as_bytes().to_vec()))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish()
    }
}
