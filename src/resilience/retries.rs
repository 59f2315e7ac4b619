//! Retry logic for node calls.
//!
//! # Responsibilities
//! - Decide whether a failed attempt is retried (transport errors and 5xx only)
//! - Wait a fixed interval between attempts
//! - Abort immediately when the caller's cancellation signal fires
//!
//! # Design Decisions
//! - Every node call is a POST, but node reads are idempotent, so method is
//!   not part of the decision
//! - The last error is always surfaced once attempts are exhausted

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::lifecycle::CancelSignal;
use crate::observability::metrics;
use crate::rpc::{RpcError, RpcResult};

/// Bounded retry with a fixed wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait between attempts.
    pub wait: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_retries: u32, wait: Duration) -> Self {
        Self { max_retries, wait }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts are used up. `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, label: &str, cancel: &CancelSignal, mut op: F) -> RpcResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = RpcResult<T>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RpcError::Cancelled),
                result = op(attempt) => result,
            };

            let err = match result {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt >= self.max_attempts() {
                return Err(err);
            }

            metrics::record_rpc_retry(label);
            tracing::warn!(
                method = label,
                attempt = attempt,
                delay = ?self.wait,
                error = %err,
                "Retrying RPC call"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RpcError::Cancelled),
                _ = tokio::time::sleep(self.wait) => {}
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.wait())
    }
}
