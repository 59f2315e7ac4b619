//! Chain-level types and error definitions.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::codec::CodecError;
use crate::rpc::RpcError;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Malformed address, hex or ABI data.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Node call failed after retries.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// A batched call could not be prepared.
    #[error("Call {index} invalid: {source}")]
    Call {
        index: usize,
        #[source]
        source: CodecError,
    },

    /// Aggregated result count does not match the number of calls.
    #[error("Result count mismatch: expected {expected}, got {actual}")]
    ResultCountMismatch { expected: usize, actual: usize },

    /// Status polling ran past its deadline. `status` is always `Failed`.
    #[error("Deadline exceeded after {waited:?} (status {status})")]
    DeadlineExceeded { waited: Duration, status: TxStatus },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// Node rejected or could not execute a contract call.
    #[error("Contract call failed: {0}")]
    ContractCall(String),

    /// Invalid private key or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Existing transaction id does not match the raw data hash.
    #[error("Transaction id mismatch: envelope has {expected}, raw data hashes to {computed}")]
    TxIdMismatch { expected: String, computed: String },

    /// Transaction envelope is missing required fields.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Node response has an unexpected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl BlockchainError {
    /// Fold pipeline cancellation into the chain-level variant.
    pub(crate) fn from_rpc(err: RpcError) -> Self {
        match err {
            RpcError::Cancelled => Self::Cancelled,
            other => Self::Rpc(other),
        }
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// On-chain execution status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxStatus {
    /// Not yet included in a block.
    Pending,
    /// Included, receipt reports success.
    Success,
    /// Included with a failing receipt, or never confirmed in time.
    Failed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "PENDING",
            TxStatus::Success => "SUCCESS",
            TxStatus::Failed => "FAILED",
        }
    }

    /// Whether polling should stop at this status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxStatus::Pending)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
