//! Client library for the TRON node HTTP API.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller
//!     │
//!     ├─▶ blockchain::wallet     sign transaction envelopes
//!     ├─▶ blockchain::multicall  N reads in one constant call
//!     ├─▶ blockchain::trc20      token reads / transfer builder
//!     ├─▶ blockchain::status     poll until SUCCESS / FAILED / deadline
//!     │         │
//!     │         ▼
//!     │   codec::{base58, address, abi}   pure encoding, no I/O
//!     │         │
//!     ▼         ▼
//!   rpc::RpcClient ──▶ resilience::retries ──▶ rpc::transport (reqwest)
//!
//!   Cross-cutting: config, lifecycle (cancellation), observability
//! ```

// Pure codecs
pub mod codec;

// Network
pub mod resilience;
pub mod rpc;

// Chain operations
pub mod blockchain;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use blockchain::{BlockchainError, TxStatus, Wallet};
pub use codec::{CodecError, TronAddress};
pub use config::ClientConfig;
pub use lifecycle::{CancelSignal, Cancellation};
pub use rpc::{RpcClient, RpcError};
