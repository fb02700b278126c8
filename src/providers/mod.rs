//! Vendor adapters
//!
//! Each submodule implements [`LlmProvider`](crate::traits::LlmProvider)
//! against one vendor's wire protocol. Shared here: allow-list checks and
//! turning non-2xx responses into [`SgptError::ApiRequestFailed`].

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use std::io::Write;

use serde::Deserialize;

use crate::error::SgptError;
use crate::streaming::{StreamDecoder, pump_stream};
use crate::transport::HttpTransport;

/// `{"error": {"message": "..."}}`, the envelope all three vendors use.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Build the error for a non-2xx response.
///
/// Surfaces the vendor's `error.message` when the body carries one, else
/// `status <code>`.
pub fn classify_http_error(provider_id: &str, status: u16, body: &[u8]) -> SgptError {
    let message = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("status {status}"));

    let sample: String = String::from_utf8_lossy(body).chars().take(200).collect();
    tracing::error!(provider = provider_id, status, body = %sample, "API error response");

    SgptError::api_error(status, message)
}

/// Reject a model outside the adapter's fixed roster.
pub(crate) fn ensure_supported(model: &str, supported: &[&str]) -> Result<(), SgptError> {
    if supported.contains(&model) {
        Ok(())
    } else {
        Err(SgptError::UnsupportedModel(model.to_string()))
    }
}

/// Read the body of a non-streaming response, failing on non-2xx status.
pub(crate) async fn read_success_body(
    transport: &HttpTransport,
    provider_id: &str,
    response: reqwest::Response,
) -> Result<Vec<u8>, SgptError> {
    let status = response.status();
    let body = transport.read_all(response).await?;
    if !status.is_success() {
        return Err(classify_http_error(provider_id, status.as_u16(), &body));
    }
    Ok(body)
}

/// Pass a streaming response through, or read its body and fail on non-2xx status.
pub(crate) async fn ensure_stream_success(
    transport: &HttpTransport,
    provider_id: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, SgptError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = transport.read_all(response).await?;
    Err(classify_http_error(provider_id, status.as_u16(), &body))
}

/// Decode a 2xx SSE response with `decoder`, writing text to `out`.
///
/// A stream cut short by cancellation reports [`SgptError::Cancelled`]
/// rather than success.
pub(crate) async fn stream_to_output<D: StreamDecoder>(
    transport: &HttpTransport,
    response: reqwest::Response,
    decoder: &D,
    out: &mut (dyn Write + Send),
) -> Result<(), SgptError> {
    let events = transport.sse_events(response);
    pump_stream(events, decoder, out).await?;
    if transport.is_cancelled() {
        return Err(SgptError::Cancelled);
    }
    Ok(())
}

/// Parse a 2xx body, mapping shape mismatches to [`SgptError::NoResponseGenerated`].
pub(crate) fn parse_body<'a, T: Deserialize<'a>>(
    provider_id: &str,
    body: &'a [u8],
) -> Result<T, SgptError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::error!(provider = provider_id, error = %e, "failed to parse response");
        SgptError::NoResponseGenerated(format!("failed to parse response: {e}"))
    })
}
