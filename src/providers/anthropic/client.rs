//! Anthropic Messages API client

use std::io::Write;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::streaming::AnthropicEventConverter;
use super::types::*;
use crate::error::SgptError;
use crate::providers::{
    ensure_stream_success, ensure_supported, parse_body, read_success_body, stream_to_output,
};
use crate::traits::LlmProvider;
use crate::transport::HttpTransport;
use crate::types::{Request, Response};
use crate::utils::redact::dump_json;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";
pub const MAX_TOKENS: u32 = 1000;

const PROVIDER_ID: &str = "anthropic";
const MESSAGES_PATH: &str = "/v1/messages";

pub const SUPPORTED_MODELS: &[&str] = &[
    "claude-v1",
    "claude-v1.2",
    "claude-3-haiku-20240307",
    "claude-3-5-sonnet-20240620",
];

/// Build the Messages request body. The `system` field is left out when
/// there is no instruction.
pub fn build_payload(request: &Request, stream: bool) -> Result<MessagesRequest, SgptError> {
    ensure_supported(&request.model, SUPPORTED_MODELS)?;

    Ok(MessagesRequest {
        model: request.model.clone(),
        max_tokens: MAX_TOKENS,
        temperature: request.temperature,
        stream,
        messages: vec![AnthropicMessage {
            role: "user",
            content: request.input.clone(),
        }],
        system: (!request.instruction.is_empty()).then(|| request.instruction.clone()),
    })
}

/// Concatenate every `text` content block, trimmed.
pub fn parse_response(body: &[u8]) -> Result<String, SgptError> {
    let response: MessagesResponse = parse_body(PROVIDER_ID, body)?;
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() {
        return Err(SgptError::NoResponseGenerated(
            "response contained no text content".into(),
        ));
    }
    Ok(text.trim().to_string())
}

/// Anthropic adapter
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    transport: HttpTransport,
    api_key: SecretString,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(transport: HttpTransport, api_key: SecretString) -> Self {
        Self {
            transport,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn send(
        &self,
        request: &Request,
        stream: bool,
    ) -> Result<reqwest::Response, SgptError> {
        let payload = build_payload(request, stream)?;
        dump_json("Anthropic request payload", &payload);

        let mut builder = self
            .transport
            .post(&format!("{}{}", self.base_url, MESSAGES_PATH))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&payload);
        if stream {
            builder = builder.header(reqwest::header::ACCEPT, "text/event-stream");
        }
        self.transport.send(builder).await
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn complete(&self, request: &Request) -> Result<Response, SgptError> {
        let response = self.send(request, false).await?;
        let body = read_success_body(&self.transport, PROVIDER_ID, response).await?;
        let text = parse_response(&body)?;
        Ok(Response::new(text, body))
    }

    async fn stream_complete(
        &self,
        request: &Request,
        out: &mut (dyn Write + Send),
    ) -> Result<(), SgptError> {
        let response = self.send(request, true).await?;
        let response = ensure_stream_success(&self.transport, PROVIDER_ID, response).await?;
        stream_to_output(&self.transport, response, &AnthropicEventConverter, out).await
    }
}
