//! Shared HTTP transport
//!
//! One [`HttpTransport`] is built per run and shared, read-only, by every
//! adapter. It issues one request at a time and never retries. Every await
//! races the run's cancellation token so an interrupt aborts the in-flight
//! call.

use std::time::Duration;

use eventsource_stream::Event;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::SgptError;
use crate::streaming::sse_event_stream;
use crate::utils::redact::redact_headers;

/// Connection and timeout settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// One deadline for the handshake and the body read of a non-streaming
    /// call together. SSE bodies are not bounded.
    pub request_timeout: Duration,
    /// Total idle connections the pool is sized for. reqwest only exposes a
    /// per-host cap, so this is advisory.
    pub max_idle_connections: usize,
    pub max_idle_per_host: usize,
    pub idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_idle_connections: 100,
            max_idle_per_host: 20,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Thin request executor over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: TransportConfig,
    cancel: CancellationToken,
}

impl HttpTransport {
    /// Transport with the default timeouts and pool sizes.
    pub fn new() -> Result<Self, SgptError> {
        Self::with_config(TransportConfig::default())
    }

    pub fn with_config(config: TransportConfig) -> Result<Self, SgptError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout)
            .connect_timeout(config.request_timeout)
            .build()
            .map_err(|e| SgptError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Abort in-flight calls when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Start a POST request on the pooled client.
    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.post(url)
    }

    /// Send a request and wait for the response headers.
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, SgptError> {
        let request = request.build()?;
        tracing::debug!(
            method = %request.method(),
            url = %redacted_url(request.url()),
            headers = ?redact_headers(request.headers()),
            "sending HTTP request"
        );

        let deadline = Deadline(Instant::now() + self.config.request_timeout);
        let fut = tokio::time::timeout_at(deadline.0, self.client.execute(request));
        let mut response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(SgptError::Cancelled),
            res = fut => match res {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "HTTP request failed");
                    return Err(e.into());
                }
                Err(_) => {
                    tracing::error!("HTTP request timed out");
                    return Err(SgptError::transport(format!(
                        "request timed out after {:?}",
                        self.config.request_timeout
                    )));
                }
            },
        };

        tracing::debug!(
            status = %response.status(),
            content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(""),
            "received HTTP response"
        );
        response.extensions_mut().insert(deadline);
        Ok(response)
    }

    /// Read the whole response body, within the time left from [`HttpTransport::send`].
    pub async fn read_all(&self, response: reqwest::Response) -> Result<Vec<u8>, SgptError> {
        let deadline = response
            .extensions()
            .get::<Deadline>()
            .map(|d| d.0)
            .unwrap_or_else(|| Instant::now() + self.config.request_timeout);
        let fut = tokio::time::timeout_at(deadline, response.bytes());
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SgptError::Cancelled),
            res = fut => match res {
                Ok(Ok(bytes)) => Ok(bytes.to_vec()),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "failed to read response body");
                    Err(SgptError::transport(format!("failed to read response body: {e}")))
                }
                Err(_) => Err(SgptError::transport(format!(
                    "request timed out after {:?}",
                    self.config.request_timeout
                ))),
            },
        }
    }

    /// Decode a response body as server-sent events.
    ///
    /// The stream ends at end-of-body or when the run is cancelled; callers
    /// can tell the two apart with [`HttpTransport::is_cancelled`].
    pub fn sse_events(
        &self,
        response: reqwest::Response,
    ) -> BoxStream<'static, Result<Event, SgptError>> {
        let cancel = self.cancel.clone();
        sse_event_stream(response.bytes_stream())
            .take_until(cancel.cancelled_owned())
            .boxed()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// When a non-streaming exchange must be complete, set once per request.
#[derive(Debug, Clone, Copy)]
struct Deadline(Instant);

/// URL without its query string. Gemini carries the API key there.
fn redacted_url(url: &reqwest::Url) -> String {
    let mut url = url.clone();
    if url.query().is_some() {
        url.set_query(Some("[REDACTED]"));
    }
    url.to_string()
}
