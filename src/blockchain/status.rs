//! Transaction status polling.
//!
//! # Data Flow
//! ```text
//! StatusPoller::wait(tx_id)
//!     → tick every `interval` (first query one interval after start)
//!     → StatusSource::transaction_status (gettransactioninfobyid)
//!     → Pending: keep polling | Success / Failed: return
//! ```
//!
//! The whole loop runs under one deadline. A query error ends the loop
//! immediately; transient failures were already retried by the RPC client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};

use crate::blockchain::types::{BlockchainError, BlockchainResult, TxStatus};
use crate::config::schema::PollingConfig;
use crate::lifecycle::CancelSignal;
use crate::observability::metrics;
use crate::rpc::api::ValueRequest;
use crate::rpc::RpcClient;

/// One block period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Roughly the time for a transaction to reach a solidified block.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(80);

/// Subset of `gettransactioninfobyid` needed to derive a status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInfo {
    #[serde(rename = "blockNumber", default)]
    pub block_number: i64,
    #[serde(default)]
    pub receipt: Receipt,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Receipt {
    #[serde(default)]
    pub result: String,
}

/// Map transaction info to a status.
///
/// No block yet means pending. Once included, an empty or `SUCCESS` receipt
/// result is success and anything else (`REVERT`, `OUT_OF_ENERGY`, ...) failed.
pub fn convert_status(info: &TransactionInfo) -> TxStatus {
    if info.block_number == 0 {
        return TxStatus::Pending;
    }
    match info.receipt.result.as_str() {
        "" | "SUCCESS" => TxStatus::Success,
        _ => TxStatus::Failed,
    }
}

/// Anything that can report the status of a transaction.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn transaction_status(&self, tx_id: &str) -> BlockchainResult<TxStatus>;
}

#[async_trait]
impl StatusSource for RpcClient {
    async fn transaction_status(&self, tx_id: &str) -> BlockchainResult<TxStatus> {
        let info: TransactionInfo = self
            .call("gettransactioninfobyid", &ValueRequest { value: tx_id })
            .await
            .map_err(BlockchainError::from_rpc)?;
        Ok(convert_status(&info))
    }
}

/// Polls a [`StatusSource`] until a transaction reaches a terminal status.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    interval: Duration,
    max_wait: Duration,
    cancel: CancelSignal,
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_WAIT)
    }
}

/// Shortest tick period; a zero interval is raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

impl StatusPoller {
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
            max_wait,
            cancel: CancelSignal::never(),
        }
    }

    pub fn from_config(config: &PollingConfig) -> Self {
        Self::new(config.interval(), config.max_wait())
    }

    /// Observe a cancellation signal between ticks.
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Wait until `tx_id` is `Success` or `Failed`.
    ///
    /// Returns `DeadlineExceeded` (carrying status `Failed`) once `max_wait`
    /// has elapsed, `Cancelled` if the signal fires, or the first query error.
    pub async fn wait<S>(&self, source: &S, tx_id: &str) -> BlockchainResult<TxStatus>
    where
        S: StatusSource + ?Sized,
    {
        let started = Instant::now();
        let polled = timeout(self.max_wait, self.poll_loop(source, tx_id)).await;

        match polled {
            Ok(Ok(status)) => {
                tracing::info!(
                    tx_id = %tx_id,
                    status = %status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Transaction reached terminal status"
                );
                Ok(status)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::info!(
                    tx_id = %tx_id,
                    max_wait_secs = self.max_wait.as_secs(),
                    "Transaction status deadline exceeded"
                );
                metrics::record_poll("deadline");
                Err(BlockchainError::DeadlineExceeded {
                    waited: self.max_wait,
                    status: TxStatus::Failed,
                })
            }
        }
    }

    async fn poll_loop<S>(&self, source: &S, tx_id: &str) -> BlockchainResult<TxStatus>
    where
        S: StatusSource + ?Sized,
    {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(BlockchainError::Cancelled),
                _ = ticker.tick() => {}
            }

            let status = source.transaction_status(tx_id).await?;
            metrics::record_poll(status.as_str());

            if status.is_terminal() {
                return Ok(status);
            }
            tracing::debug!(tx_id = %tx_id, "Transaction pending");
        }
    }
}

/// Wait with the default interval and the given deadline.
pub async fn wait_for_status(
    client: &RpcClient,
    tx_id: &str,
    max_wait: Duration,
) -> BlockchainResult<TxStatus> {
    StatusPoller::new(DEFAULT_POLL_INTERVAL, max_wait)
        .with_cancel(client.cancel_signal().clone())
        .wait(client, tx_id)
        .await
}
