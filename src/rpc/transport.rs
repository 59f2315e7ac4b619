//! HTTP transport for node calls.
//!
//! # Responsibilities
//! - Send one JSON POST and return status + body
//! - Cap the number of body bytes read
//! - Report connection-level failures as `RpcError::Transport`
//!
//! Status classification and JSON decoding happen in the client, so a custom
//! transport only has to move bytes.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use url::Url;

use crate::rpc::{RpcError, RpcResult};

/// Raw HTTP exchange result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body bytes, at most the configured cap.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Lossy text view of the body, for error messages.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Something that can POST a JSON body to a URL.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one POST. Implementations must not read more than `max_body_bytes`.
    async fn post_json(
        &self,
        url: &Url,
        headers: &HeaderMap,
        body: Vec<u8>,
        max_body_bytes: usize,
    ) -> RpcResult<HttpResponse>;
}

/// Default transport backed by a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with connect and total request timeouts.
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> RpcResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| RpcError::Transport(format!("build http client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (shares its connection pool).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &Url,
        headers: &HeaderMap,
        body: Vec<u8>,
        max_body_bytes: usize,
    ) -> RpcResult<HttpResponse> {
        let mut response = self
            .client
            .post(url.clone())
            .headers(headers.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let mut buf = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?
        {
            let room = max_body_bytes - buf.len();
            if chunk.len() >= room {
                buf.extend_from_slice(&chunk[..room]);
                if chunk.len() > room {
                    tracing::warn!(
                        url = %url,
                        max_body_bytes = max_body_bytes,
                        "Response body truncated"
                    );
                }
                break;
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(HttpResponse { status, body: buf })
    }
}
