//! Metrics collection.
//!
//! # Metrics
//! - `tron_rpc_requests_total` (counter): attempts by method and outcome
//! - `tron_rpc_retries_total` (counter): retries by method
//! - `tron_tx_polls_total` (counter): status queries by observed status
//!
//! Without an installed recorder these calls are no-ops.

use metrics::counter;

/// Outcome label for a single RPC attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Api,
    Transport,
    Decode,
}

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Api => "api_error",
            Outcome::Transport => "transport_error",
            Outcome::Decode => "decode_error",
        }
    }
}

/// Record one RPC attempt.
pub fn record_rpc_request(method: &str, outcome: Outcome) {
    counter!(
        "tron_rpc_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record a retry decision.
pub fn record_rpc_retry(method: &str) {
    counter!("tron_rpc_retries_total", "method" => method.to_string()).increment(1);
}

/// Record one status poll.
pub fn record_poll(status: &'static str) {
    counter!("tron_tx_polls_total", "status" => status).increment(1);
}
