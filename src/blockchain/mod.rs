//! Chain operations built on the RPC client.
//!
//! # Data Flow
//! ```text
//! wallet.rs    (key loading, txID check, secp256k1 signing)
//! status.rs    (gettransactioninfobyid polling until terminal status)
//! multicall.rs (N reads → one aggregate constant call → N results)
//! trc20.rs     (token reads, transfer building)
//!     → rpc::RpcClient (retry, classification)
//! ```
//!
//! # Security Constraints
//! - Private keys are never logged
//! - A transaction whose `txID` disagrees with its raw data is never signed

pub mod multicall;
pub mod status;
pub mod trc20;
pub mod types;
pub mod wallet;

pub use multicall::{CallDescriptor, Multicall};
pub use status::{convert_status, wait_for_status, StatusPoller, StatusSource};
pub use trc20::Trc20;
pub use types::{BlockchainError, BlockchainResult, TxStatus};
pub use wallet::{TransactionEnvelope, Wallet};
