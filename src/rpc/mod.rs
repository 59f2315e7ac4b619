//! Node HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! caller (api.rs wrappers, multicall, poller)
//!     → client.rs (path normalization, body encoding)
//!     → resilience::retries (bounded retry, fixed wait, cancellation)
//!     → transport.rs (one POST, capped body read)
//!     → classify: 2xx JSON / Api{status} / Transport / Decode
//! ```
//!
//! # Design Decisions
//! - This is the only network egress point of the crate
//! - Transport is a trait so tests and callers can swap the HTTP stack
//! - Only transport failures and 5xx are retried

pub mod api;
pub mod client;
pub mod transport;

use thiserror::Error;

pub use client::{RpcClient, RpcClientBuilder};
pub use transport::{HttpResponse, ReqwestTransport, Transport};

/// Errors produced by the RPC pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Connection-level failure (DNS, connect, reset, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx HTTP status.
    #[error("tron api error: status={status} body={body}")]
    Api { status: u16, body: String },

    /// 2xx response whose body is not the expected JSON.
    #[error("unmarshal response: {message}; body={body}")]
    Decode { message: String, body: String },

    /// Request body could not be serialized.
    #[error("marshal request: {0}")]
    Serialize(String),

    /// Base URL or method path does not form a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Configured header name or value is invalid.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Caller cancelled while the call was in flight or waiting to retry.
    #[error("request cancelled")]
    Cancelled,
}

impl RpcError {
    /// Transport failures and server-side (5xx) errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            RpcError::Transport(_) => true,
            RpcError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(RpcError::Transport("reset".into()).is_retryable());
        assert!(RpcError::Api { status: 500, body: String::new() }.is_retryable());
        assert!(RpcError::Api { status: 503, body: String::new() }.is_retryable());
        assert!(!RpcError::Api { status: 404, body: String::new() }.is_retryable());
        assert!(!RpcError::Api { status: 429, body: String::new() }.is_retryable());
        assert!(!RpcError::Decode { message: "eof".into(), body: String::new() }.is_retryable());
        assert!(!RpcError::Cancelled.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = RpcError::Api { status: 502, body: "bad gateway".into() };
        assert_eq!(err.to_string(), "tron api error: status=502 body=bad gateway");
    }
}
