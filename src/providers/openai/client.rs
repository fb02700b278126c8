//! OpenAI client
//!
//! Chat models (`gpt-*`) go to `/v1/chat/completions`; the legacy text
//! models go to `/v1/completions` with a flat prompt. Only the `gpt-4o`
//! family receives image/audio content parts.

use std::io::Write;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::streaming::OpenAiEventConverter;
use super::types::*;
use crate::error::SgptError;
use crate::providers::{
    ensure_stream_success, ensure_supported, parse_body, read_success_body, stream_to_output,
};
use crate::traits::LlmProvider;
use crate::transport::HttpTransport;
use crate::types::{Request, Response};
use crate::utils::media;
use crate::utils::redact::dump_json;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const PROVIDER_ID: &str = "openai";
const CHAT_PATH: &str = "/v1/chat/completions";
const COMPLETIONS_PATH: &str = "/v1/completions";

/// Chat models that accept image and audio parts.
pub const MULTIMODAL_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini"];

/// Text-only chat models.
pub const CHAT_MODELS: &[&str] = &[
    "gpt-4",
    "gpt-4-0314",
    "gpt-4-32k",
    "gpt-4-32k-0314",
    "gpt-3.5-turbo",
];

/// Models served by the legacy completions endpoint.
pub const LEGACY_MODELS: &[&str] = &[
    "text-davinci-003",
    "text-davinci-002",
    "text-curie-001",
    "text-babbage-001",
    "text-ada-001",
];

/// Request body for either endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OpenAiPayload {
    Chat(ChatCompletionRequest),
    Completion(CompletionRequest),
}

fn is_chat_model(model: &str) -> bool {
    model.starts_with("gpt-")
}

/// Build the request body for `request`.
///
/// Fails with [`SgptError::UnsupportedModel`] for models outside the roster.
pub async fn build_payload(request: &Request, stream: bool) -> Result<OpenAiPayload, SgptError> {
    let model = request.model.as_str();

    if MULTIMODAL_MODELS.contains(&model) {
        let mut messages = Vec::with_capacity(2);
        if !request.instruction.is_empty() {
            messages.push(ChatMessage::system(request.instruction.clone()));
        }

        let mut parts = Vec::new();
        if !request.input.is_empty() {
            parts.push(ContentPart::Text {
                text: request.input.clone(),
            });
        }
        if let Some(path) = &request.image_path {
            let image = media::load_image(path).await?;
            parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.to_uri(),
                },
            });
        }
        if let Some(path) = &request.audio_path {
            let audio = media::load_audio(path).await?;
            parts.push(ContentPart::Audio {
                audio: AudioData {
                    data: audio.to_uri(),
                },
            });
        }
        messages.push(ChatMessage::user(MessageContent::Parts(parts)));

        return Ok(OpenAiPayload::Chat(ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature: request.temperature,
            stream,
        }));
    }

    if CHAT_MODELS.contains(&model) {
        return Ok(OpenAiPayload::Chat(ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(request.instruction.clone()),
                ChatMessage::user(MessageContent::Text(request.input.clone())),
            ],
            temperature: request.temperature,
            stream,
        }));
    }

    ensure_supported(model, LEGACY_MODELS)?;
    Ok(OpenAiPayload::Completion(CompletionRequest {
        model: model.to_string(),
        prompt: format!("{} {}", request.instruction, request.input),
        temperature: request.temperature,
        stream,
    }))
}

/// Extract the trimmed completion text from a 2xx body.
pub fn parse_response(model: &str, body: &[u8]) -> Result<String, SgptError> {
    if is_chat_model(model) {
        let response: ChatCompletionResponse = parse_body(PROVIDER_ID, body)?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SgptError::NoResponseGenerated("response contained no choices".into()))?;
        return Ok(choice.message.content.unwrap_or_default().trim().to_string());
    }

    let response: CompletionResponse = parse_body(PROVIDER_ID, body)?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| SgptError::NoResponseGenerated("response contained no choices".into()))?;
    Ok(choice.text.trim().to_string())
}

/// OpenAI adapter
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    transport: HttpTransport,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(transport: HttpTransport, api_key: SecretString) -> Self {
        Self {
            transport,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the adapter at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        let path = if is_chat_model(model) {
            CHAT_PATH
        } else {
            COMPLETIONS_PATH
        };
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: &Request,
        stream: bool,
    ) -> Result<reqwest::Response, SgptError> {
        let payload = build_payload(request, stream).await?;
        dump_json("OpenAI request payload", &payload);

        let mut builder = self
            .transport
            .post(&self.endpoint(&request.model))
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload);
        if stream {
            builder = builder.header(reqwest::header::ACCEPT, "text/event-stream");
        }
        self.transport.send(builder).await
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn complete(&self, request: &Request) -> Result<Response, SgptError> {
        let response = self.send(request, false).await?;
        let body = read_success_body(&self.transport, PROVIDER_ID, response).await?;
        let text = parse_response(&request.model, &body)?;
        Ok(Response::new(text, body))
    }

    async fn stream_complete(
        &self,
        request: &Request,
        out: &mut (dyn Write + Send),
    ) -> Result<(), SgptError> {
        if !is_chat_model(&request.model) {
            return Err(SgptError::UnsupportedModel(format!(
                "{} (streaming requires a chat model)",
                request.model
            )));
        }

        let response = self.send(request, true).await?;
        let response = ensure_stream_success(&self.transport, PROVIDER_ID, response).await?;
        stream_to_output(&self.transport, response, &OpenAiEventConverter, out).await
    }
}
