//! Node RPC client with retry and error classification.
//!
//! # Responsibilities
//! - Route method paths under the configured namespace
//! - Encode request bodies (`{}` when there is no payload)
//! - Classify every attempt: 2xx JSON, API error, transport error, decode error
//! - Delegate retry and cancellation to `resilience::retries`

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::schema::{ClientConfig, Namespace, DEFAULT_MAX_BODY_BYTES};
use crate::lifecycle::CancelSignal;
use crate::observability::metrics::{self, Outcome};
use crate::resilience::retries::RetryPolicy;
use crate::rpc::transport::{ReqwestTransport, Transport};
use crate::rpc::{RpcError, RpcResult};

/// Header TronGrid reads the API key from.
pub const API_KEY_HEADER: &str = "TRON-PRO-API-KEY";

/// Route a method path under `default` unless it already names a namespace.
pub fn normalize_path(method: &str, default: Namespace) -> String {
    let path = method.trim().trim_start_matches('/');
    let qualified = [Namespace::Wallet, Namespace::WalletSolidity]
        .iter()
        .any(|ns| path.starts_with(&format!("{}/", ns.as_str())));
    if qualified {
        path.to_string()
    } else {
        format!("{}/{}", default.as_str(), path)
    }
}

struct Inner {
    base_url: String,
    namespace: Namespace,
    visible: bool,
    headers: HeaderMap,
    retry: RetryPolicy,
    max_body_bytes: usize,
    transport: Arc<dyn Transport>,
}

/// Client for a TRON node's HTTP API.
///
/// Cloning is cheap; clones share configuration and the connection pool.
#[derive(Clone)]
pub struct RpcClient {
    inner: Arc<Inner>,
    cancel: CancelSignal,
}

impl RpcClient {
    /// Client for the full node API with default settings.
    pub fn new(base_url: &str) -> RpcResult<Self> {
        Self::builder(base_url).build()
    }

    /// Client for the solidity (confirmed state) API with default settings.
    pub fn solidity(base_url: &str) -> RpcResult<Self> {
        Self::builder(base_url)
            .namespace(Namespace::WalletSolidity)
            .build()
    }

    /// Start building a client.
    pub fn builder(base_url: &str) -> RpcClientBuilder {
        RpcClientBuilder::new(base_url)
    }

    /// Build a client from a loaded configuration.
    pub fn from_config(config: &ClientConfig) -> RpcResult<Self> {
        let rpc = &config.rpc;
        let mut builder = Self::builder(&rpc.base_url)
            .namespace(rpc.namespace)
            .visible(rpc.visible)
            .retry(RetryPolicy::from(&config.retries))
            .max_body_bytes(rpc.max_body_bytes)
            .timeouts(
                Duration::from_secs(rpc.connect_timeout_secs),
                Duration::from_secs(rpc.request_timeout_secs),
            );
        if let Some(key) = &rpc.api_key {
            builder = builder.api_key(key);
        }
        for (name, value) in &rpc.headers {
            builder = builder.header(name, value);
        }
        builder.build()
    }

    /// A clone whose calls observe `signal`.
    pub fn with_cancel(&self, signal: CancelSignal) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cancel: signal,
        }
    }

    /// The signal this client observes.
    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Default namespace for unqualified paths.
    pub fn namespace(&self) -> Namespace {
        self.inner.namespace
    }

    /// Whether requests ask for Base58 addresses.
    pub fn visible(&self) -> bool {
        self.inner.visible
    }

    /// Retry policy in effect.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry
    }

    /// Full URL a method path resolves to.
    pub fn url_for(&self, method: &str) -> RpcResult<Url> {
        let path = normalize_path(method, self.inner.namespace);
        Url::parse(&format!("{}/{}", self.inner.base_url, path))
            .map_err(|e| RpcError::InvalidUrl(format!("{}/{}: {}", self.inner.base_url, path, e)))
    }

    /// Call `method` with `body` and decode the JSON response as `T`.
    ///
    /// A body that serializes to `null` (e.g. `()` or `None`) is sent as `{}`.
    pub async fn call<T, B>(&self, method: &str, body: &B) -> RpcResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url_for(method)?;
        let payload = encode_body(body)?;
        let label = normalize_path(method, self.inner.namespace);
        let url = &url;
        let label = label.as_str();

        self.inner
            .retry
            .run(label, &self.cancel, move |attempt| {
                let payload = payload.clone();
                async move {
                    tracing::debug!(method = label, attempt = attempt, "Sending RPC request");
                    self.attempt(url, payload, label).await
                }
            })
            .await
    }

    /// Call `method` without a payload.
    pub async fn call_empty<T: DeserializeOwned>(&self, method: &str) -> RpcResult<T> {
        self.call(method, &()).await
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        url: &Url,
        payload: Vec<u8>,
        label: &str,
    ) -> RpcResult<T> {
        let response = match self
            .inner
            .transport
            .post_json(url, &self.inner.headers, payload, self.inner.max_body_bytes)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                metrics::record_rpc_request(label, Outcome::Transport);
                return Err(e);
            }
        };

        if !response.is_success() {
            metrics::record_rpc_request(label, Outcome::Api);
            return Err(RpcError::Api {
                status: response.status,
                body: response.body_text(),
            });
        }

        match serde_json::from_slice(&response.body) {
            Ok(value) => {
                metrics::record_rpc_request(label, Outcome::Ok);
                Ok(value)
            }
            Err(e) => {
                metrics::record_rpc_request(label, Outcome::Decode);
                Err(RpcError::Decode {
                    message: e.to_string(),
                    body: response.body_text(),
                })
            }
        }
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> RpcResult<Vec<u8>> {
    let value = serde_json::to_value(body).map_err(|e| RpcError::Serialize(e.to_string()))?;
    if value.is_null() {
        return Ok(b"{}".to_vec());
    }
    serde_json::to_vec(&value).map_err(|e| RpcError::Serialize(e.to_string()))
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("base_url", &self.inner.base_url)
            .field("namespace", &self.inner.namespace)
            .field("visible", &self.inner.visible)
            .field("retry", &self.inner.retry)
            .finish()
    }
}

/// Builder for [`RpcClient`].
pub struct RpcClientBuilder {
    base_url: String,
    namespace: Namespace,
    visible: bool,
    headers: Vec<(String, String)>,
    retry: RetryPolicy,
    max_body_bytes: usize,
    connect_timeout: Duration,
    request_timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
    cancel: CancelSignal,
}

impl RpcClientBuilder {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            namespace: Namespace::Wallet,
            visible: false,
            headers: Vec::new(),
            retry: RetryPolicy::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            connect_timeout: Duration::from_secs(6),
            request_timeout: Duration::from_secs(12),
            transport: None,
            cancel: CancelSignal::never(),
        }
    }

    /// Namespace for unqualified method paths.
    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Ask the node for Base58 addresses.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Send a TronGrid API key.
    pub fn api_key(self, key: &str) -> Self {
        self.header(API_KEY_HEADER, key)
    }

    /// Retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Response body cap.
    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Connect and total request timeouts for the default transport.
    pub fn timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    /// Use a custom transport instead of the default reqwest client.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Cancellation signal observed by the built client.
    pub fn cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = signal;
        self
    }

    /// Validate settings and build the client.
    pub fn build(self) -> RpcResult<RpcClient> {
        Url::parse(&self.base_url)
            .map_err(|e| RpcError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_str(name)
                .map_err(|e| RpcError::InvalidHeader(format!("{}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RpcError::InvalidHeader(format!("{}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.connect_timeout, self.request_timeout)?),
        };

        tracing::debug!(
            base_url = %self.base_url,
            namespace = %self.namespace,
            max_retries = self.retry.max_retries,
            "RPC client initialized"
        );

        Ok(RpcClient {
            inner: Arc::new(Inner {
                base_url: self.base_url,
                namespace: self.namespace,
                visible: self.visible,
                headers,
                retry: self.retry,
                max_body_bytes: self.max_body_bytes,
                transport,
            }),
            cancel: self.cancel,
        })
    }
}
