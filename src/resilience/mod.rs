//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! RpcClient::call
//!     → retries.rs (attempt, classify, fixed wait, retry while retryable)
//!     → rpc::transport (connect / request timeouts enforced by reqwest)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every node call has a deadline
//! - Only transport failures and 5xx responses are retried
//! - Waiting between attempts observes the caller's cancellation signal

pub mod retries;

pub use retries::RetryPolicy;
