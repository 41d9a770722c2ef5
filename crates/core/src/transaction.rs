//! Transaction types and signing.

use crate::crypto::{verify_digest, Address, CryptoError, Keypair, Signature};
use crate::hash::{sha256_concat, Digest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors that can occur while signing a transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("cannot sign transactions for other wallets (from {expected}, signer {actual})")]
    UnauthorizedSigner { expected: Address, actual: Address },

    #[error("transaction is already signed")]
    AlreadySigned,

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Reasons a transaction (or a block's batch of them) fails verification.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no signature in this transaction")]
    MissingSignature,

    #[error("malformed sender address: {0}")]
    MalformedAddress(String),

    #[error("invalid transaction signature")]
    InvalidSignature,

    #[error("block payload is not a transaction batch")]
    NotTransactionBatch,

    #[error("transaction {index} is invalid: {source}")]
    Transaction {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

/// Render an amount the way every hash preimage sees it.
pub fn canonical_amount(amount: f64) -> String {
    format!("{:.6}", amount)
}

/// A value transfer on the ledger.
///
/// An empty `from` marks a reward transaction, which mints value and
/// needs no signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender's address (empty for rewards).
    pub from: Address,
    /// Recipient's address.
    pub to: Address,
    /// Value to transfer.
    pub amount: f64,
    /// DER signature over [`Transaction::hash`], set once by [`Transaction::sign`].
    signature: Option<Signature>,
}

impl Transaction {
    /// Create a new unsigned transaction.
    pub fn new(from: impl Into<Address>, to: impl Into<Address>, amount: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            signature: None,
        }
    }

    /// Create a reward transaction paying `amount` to `to`.
    pub fn reward(to: impl Into<Address>, amount: f64) -> Self {
        Self::new(Address::empty(), to, amount)
    }

    /// Rebuild a transaction with an existing signature (used when reloading).
    pub fn with_signature(
        from: impl Into<Address>,
        to: impl Into<Address>,
        amount: f64,
        signature: Option<Signature>,
    ) -> Self {
        Self {
            signature,
            ..Self::new(from, to, amount)
        }
    }

    /// The signature, if the transaction has been signed.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Check if this is a reward transaction.
    pub fn is_reward(&self) -> bool {
        self.from.is_empty()
    }

    /// Hash of `from ++ to ++ amount` (6 fractional digits); the signing subject.
    pub fn hash(&self) -> Digest {
        let amount = canonical_amount(self.amount);
        sha256_concat(&[
            self.from.as_str().as_bytes(),
            self.to.as_str().as_bytes(),
            amount.as_bytes(),
        ])
    }

    /// Sign the transaction with the given keypair.
    ///
    /// The keypair's address must equal `from` and the transaction must not
    /// carry a signature yet; otherwise it is left untouched.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<(), TransactionError> {
        if self.signature.is_some() {
            return Err(TransactionError::AlreadySigned);
        }
        let signer = keypair.address();
        if signer != self.from {
            return Err(TransactionError::UnauthorizedSigner {
                expected: self.from.clone(),
                actual: signer,
            });
        }
        let signature = keypair.sign_digest(&self.hash())?;
        self.signature = Some(signature);
        Ok(())
    }

    /// Create a signed transaction.
    pub fn signed(mut self, keypair: &Keypair) -> Result<Self, TransactionError> {
        self.sign(keypair)?;
        Ok(self)
    }

    /// Verify the transaction.
    ///
    /// Rewards always pass. Everything else needs a signature that verifies
    /// against the key encoded in `from`.
    pub fn verify(&self) -> Result<(), ValidationError> {
        if self.is_reward() {
            return Ok(());
        }

        let signature = self
            .signature
            .as_ref()
            .filter(|s| !s.as_bytes().is_empty())
            .ok_or(ValidationError::MissingSignature)?;

        let public_key = self
            .from
            .to_public_key()
            .map_err(|e| ValidationError::MalformedAddress(e.to_string()))?;

        let digest = self
            .hash()
            .to_bytes()
            .map_err(|_| ValidationError::InvalidSignature)?;

        if verify_digest(&public_key, &digest, signature) {
            Ok(())
        } else {
            Err(ValidationError::InvalidSignature)
        }
    }

    /// Boolean form of [`Transaction::verify`].
    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// Canonical structured form used inside block hash preimages.
    pub fn canonical_value(&self) -> Value {
        json!({
            "amount": canonical_amount(self.amount),
            "from": self.from.as_str(),
            "signature": self.signature.as_ref().map(Signature::to_hex),
            "to": self.to.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_transfer(amount: f64) -> (Keypair, Transaction) {
        let keypair = Keypair::generate().unwrap();
        let to = Keypair::generate().unwrap().address();
        let tx = Transaction::new(keypair.address(), to, amount)
            .signed(&keypair)
            .unwrap();
        (keypair, tx)
    }

    #[test]
    fn test_new_is_unsigned() {
        let tx = Transaction::new("a", "b", 1.5);
        assert!(tx.signature().is_none());
        assert!(!tx.is_reward());
    }

    #[test]
    fn test_hash_uses_fixed_precision() {
        let tx = Transaction::new("a", "b", 24.56);
        assert_eq!(tx.hash(), crate::hash::sha256(b"ab24.560000"));
    }

    #[test]
    fn test_hash_ignores_signature() {
        let (_, tx) = signed_transfer(3.0);
        let unsigned = Transaction::new(tx.from.clone(), tx.to.clone(), tx.amount);
        assert_eq!(tx.hash(), unsigned.hash());
    }

    #[test]
    fn test_sign_and_verify() {
        let (_, tx) = signed_transfer(10.0);
        assert!(tx.signature().is_some());
        assert!(tx.verify().is_ok());
        assert!(tx.is_valid());
    }

    #[test]
    fn test_unauthorized_signer() {
        let owner = Keypair::generate().unwrap();
        let thief = Keypair::generate().unwrap();
        let mut tx = Transaction::new(owner.address(), "b", 5.0);

        let err = tx.sign(&thief).unwrap_err();
        assert!(matches!(err, TransactionError::UnauthorizedSigner { .. }));
        assert!(tx.signature().is_none());
    }

    #[test]
    fn test_reward_exempt() {
        let tx = Transaction::reward("miner", 100.0);
        assert!(tx.is_reward());
        assert!(tx.is_valid());

        let with_junk = Transaction::with_signature(
            Address::empty(),
            "miner",
            100.0,
            Some(Signature::from_bytes(vec![1, 2, 3])),
        );
        assert!(with_junk.is_valid());
    }

    #[test]
    fn test_missing_signature() {
        let kp = Keypair::generate().unwrap();
        let tx = Transaction::new(kp.address(), "b", 1.0);
        assert!(matches!(tx.verify(), Err(ValidationError::MissingSignature)));
    }

    #[test]
    fn test_empty_signature_is_missing() {
        let kp = Keypair::generate().unwrap();
        let tx = Transaction::with_signature(
            kp.address(),
            "b",
            1.0,
            Some(Signature::from_bytes(vec![])),
        );
        assert!(matches!(tx.verify(), Err(ValidationError::MissingSignature)));
    }

    #[test]
    fn test_sign_twice_rejected() {
        let (keypair, mut tx) = signed_transfer(7.0);
        let original = tx.signature().cloned();

        let err = tx.sign(&keypair).unwrap_err();
        assert!(matches!(err, TransactionError::AlreadySigned));
        assert_eq!(tx.signature().cloned(), original);
        assert!(tx.is_valid());
    }

    #[test]
    fn test_malformed_address() {
        let tx = Transaction::with_signature(
            "not-a-key",
            "b",
            1.0,
            Some(Signature::from_bytes(vec![0x30, 0x00])),
        );
        assert!(matches!(tx.verify(), Err(ValidationError::MalformedAddress(_))));
    }

    #[test]
    fn test_flipped_signature_byte_fails() {
        let (_, tx) = signed_transfer(42.0);
        let sig = tx.signature().unwrap().as_bytes().to_vec();

        for i in 0..sig.len() {
            let mut tampered = sig.clone();
            tampered[i] ^= 0x01;
            let bad = Transaction::with_signature(
                tx.from.clone(),
                tx.to.clone(),
                tx.amount,
                Some(Signature::from_bytes(tampered)),
            );
            assert!(
                matches!(bad.verify(), Err(ValidationError::InvalidSignature)),
                "flipping byte {} was not detected",
                i
            );
        }
    }

    #[test]
    fn test_tampered_amount_fails() {
        let (_, mut tx) = signed_transfer(42.0);
        tx.amount = 4200.0;
        assert!(matches!(tx.verify(), Err(ValidationError::InvalidSignature)));
    }

    #[test]
    fn test_canonical_value_sorted_and_stable() {
        let tx = Transaction::new("a", "b", 1.0);
        assert_eq!(
            tx.canonical_value().to_string(),
            r#"{"amount":"1.000000","from":"a","signature":null,"to":"b"}"#
        );
    }

    #[test]
    fn test_serde_preserves_signature() {
        let (_, tx) = signed_transfer(7.25);
        let encoded = bincode::serialize(&tx).unwrap();
        let decoded: Transaction = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, tx);
        assert!(decoded.is_valid());
    }
}
