//! Key management and transaction signing.
//!
//! # Security
//! - Private keys come from the caller or the environment, never from config files
//! - Keys are never logged or serialized by this module
//!
//! # Signing
//! The transaction id is the SHA-256 of the raw transaction bytes. The same
//! digest is signed with secp256k1 and the 65-byte `r || s || v` signature
//! (`v` is the 0/1 recovery id) is appended to the envelope's `signature` list.

use alloy::primitives::B256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::codec::{decode_hex, TronAddress};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "TRON_PRIVATE_KEY";

/// Length of an encoded signature: r (32) + s (32) + recovery id (1).
pub const SIGNATURE_LEN: usize = 65;

/// Transaction JSON as produced by the node's transaction builders.
///
/// Fields this crate does not interpret are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub visible: bool,
    #[serde(rename = "txID", default, skip_serializing_if = "String::is_empty")]
    pub tx_id: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub raw_data: Value,
    #[serde(default)]
    pub raw_data_hex: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signature: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransactionEnvelope {
    /// Parse an envelope from a JSON value.
    pub fn from_json(value: Value) -> BlockchainResult<Self> {
        if !value.is_object() {
            return Err(BlockchainError::InvalidTransaction(
                "transaction must be a JSON object".into(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| BlockchainError::InvalidTransaction(e.to_string()))
    }

    /// Serialize back to JSON.
    pub fn to_json(&self) -> BlockchainResult<Value> {
        serde_json::to_value(self).map_err(|e| BlockchainError::Decode(e.to_string()))
    }

    /// Decode `raw_data_hex` into the canonical transaction bytes.
    pub fn raw_bytes(&self) -> BlockchainResult<Vec<u8>> {
        if self.raw_data_hex.trim().is_empty() {
            return Err(BlockchainError::InvalidTransaction(
                "missing raw_data_hex".into(),
            ));
        }
        Ok(decode_hex(&self.raw_data_hex)?)
    }

    /// SHA-256 of the raw bytes, which is both the id and the signing digest.
    pub fn compute_tx_id(&self) -> BlockchainResult<B256> {
        let raw = self.raw_bytes()?;
        Ok(B256::from_slice(&Sha256::digest(&raw)))
    }
}

/// Wallet holding one secp256k1 key.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// Surrounding whitespace and a `0x`/`0X` prefix are ignored.
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if key_hex.is_empty() {
            return Err(BlockchainError::Wallet("Empty private key".into()));
        }

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        let wallet = Self { signer };
        tracing::debug!(address = %wallet.address(), "Wallet initialized");
        Ok(wallet)
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `TRON_PRIVATE_KEY` from environment.
    pub fn from_env() -> BlockchainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            BlockchainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Generate a fresh random key.
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// The wallet's TRON address.
    pub fn address(&self) -> TronAddress {
        TronAddress::from(self.signer.address())
    }

    /// Hex-encoded private key, for export by the caller.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signer.to_bytes())
    }

    /// Sign a 32-byte digest and return `r || s || v` with `v` in {0, 1}.
    pub async fn sign_hash(&self, hash: B256) -> BlockchainResult<[u8; SIGNATURE_LEN]> {
        let signature = self
            .signer
            .sign_hash(&hash)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))?;

        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
        out[32..64].copy_from_slice(&signature.s().to_be_bytes::<32>());
        out[64] = u8::from(signature.v());
        Ok(out)
    }

    /// Sign an envelope in place.
    ///
    /// An empty `txID` is filled in with the computed id; a non-empty one must
    /// match it ignoring case.
    pub async fn sign_transaction(&self, tx: &mut TransactionEnvelope) -> BlockchainResult<()> {
        let digest = tx.compute_tx_id()?;
        let computed = hex::encode(digest);

        if tx.tx_id.is_empty() {
            tx.tx_id = computed;
        } else if !tx.tx_id.eq_ignore_ascii_case(&computed) {
            return Err(BlockchainError::TxIdMismatch {
                expected: tx.tx_id.clone(),
                computed,
            });
        }

        let signature = self.sign_hash(digest).await?;
        tx.signature.push(hex::encode(signature));

        tracing::debug!(tx_id = %tx.tx_id, signatures = tx.signature.len(), "Transaction signed");
        Ok(())
    }

    /// Sign a transaction given as JSON and return the signed JSON.
    pub async fn sign_json(&self, tx: Value) -> BlockchainResult<Value> {
        let mut envelope = TransactionEnvelope::from_json(tx)?;
        self.sign_transaction(&mut envelope).await?;
        envelope.to_json()
    }
}
