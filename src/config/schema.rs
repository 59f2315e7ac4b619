//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default response body cap (4 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 << 20;

/// Root configuration for the client library.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Node endpoint and HTTP settings.
    pub rpc: RpcConfig,

    /// Retry configuration for the RPC pipeline.
    pub retries: RetryConfig,

    /// Transaction status polling.
    pub polling: PollingConfig,

    /// Multicall contract settings.
    pub multicall: MulticallConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP API namespace a method path is routed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Full node API (`/wallet/...`), reads the latest state.
    #[default]
    Wallet,
    /// Solidity node API (`/walletsolidity/...`), reads confirmed state only.
    WalletSolidity,
}

impl Namespace {
    /// Path segment for this namespace.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Wallet => "wallet",
            Namespace::WalletSolidity => "walletsolidity",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Base URL of the node HTTP API (e.g., "https://api.trongrid.io").
    pub base_url: String,

    /// Namespace for method paths that are not already qualified.
    pub namespace: Namespace,

    /// Ask the node to use Base58 addresses in requests and responses.
    pub visible: bool,

    /// Optional TronGrid API key, sent as `TRON-PRO-API-KEY`.
    pub api_key: Option<String>,

    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Response bodies are truncated beyond this many bytes.
    pub max_body_bytes: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.trongrid.io".to_string(),
            namespace: Namespace::Wallet,
            visible: false,
            api_key: None,
            headers: BTreeMap::new(),
            connect_timeout_secs: 6,
            request_timeout_secs: 12,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (2 = three attempts in total).
    pub max_retries: u32,

    /// Fixed wait between attempts in milliseconds.
    pub wait_ms: u64,
}

impl RetryConfig {
    /// Wait between attempts.
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            wait_ms: 250,
        }
    }
}

/// Transaction status polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval between status queries in milliseconds (one block period).
    pub interval_ms: u64,

    /// Overall deadline for reaching a terminal status, in seconds.
    pub max_wait_secs: u64,
}

impl PollingConfig {
    /// Interval between status queries.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Overall deadline.
    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3_000,
            max_wait_secs: 80,
        }
    }
}

/// Multicall contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MulticallConfig {
    /// Address of the deployed Multicall contract, in either text form.
    pub address: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
