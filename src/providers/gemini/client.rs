//! Gemini client
//!
//! The API key travels as the `key` query parameter. Remote images are
//! referenced with `fileData`; local images and audio are inlined.

use std::io::Write;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::streaming::GeminiEventConverter;
use super::types::*;
use crate::error::SgptError;
use crate::providers::{
    ensure_stream_success, ensure_supported, parse_body, read_success_body, stream_to_output,
};
use crate::traits::LlmProvider;
use crate::transport::HttpTransport;
use crate::types::{Request, Response};
use crate::utils::media::{self, MediaSource};
use crate::utils::redact::dump_json;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const PROVIDER_ID: &str = "google";

pub const SUPPORTED_MODELS: &[&str] = &[
    "gemini-medium",
    "gemini-large",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

fn media_part(source: MediaSource) -> Part {
    match source {
        MediaSource::Url { url, mime_type } => Part {
            file_data: Some(FileData {
                mime_type,
                file_uri: url,
            }),
            ..Part::default()
        },
        MediaSource::Inline { mime_type, data } => Part {
            inline_data: Some(Blob { mime_type, data }),
            ..Part::default()
        },
    }
}

/// Build the `generateContent` body for `request`.
pub async fn build_payload(request: &Request) -> Result<GenerateContentRequest, SgptError> {
    ensure_supported(&request.model, SUPPORTED_MODELS)?;

    let mut parts = Vec::new();
    if !request.input.is_empty() || !request.has_media() {
        parts.push(Part::text(request.input.clone()));
    }
    if let Some(path) = &request.image_path {
        parts.push(media_part(media::load_image(path).await?));
    }
    if let Some(path) = &request.audio_path {
        parts.push(media_part(media::load_audio(path).await?));
    }

    let system_instruction = (!request.instruction.is_empty()).then(|| Content {
        role: None,
        parts: vec![Part::text(request.instruction.clone())],
    });

    Ok(GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        system_instruction,
        generation_config: GenerationConfig {
            temperature: request.temperature,
        },
    })
}

/// `candidates[0].content.parts[0].text`, trimmed.
pub fn parse_response(body: &[u8]) -> Result<String, SgptError> {
    let response: GenerateContentResponse = parse_body(PROVIDER_ID, body)?;
    response
        .first_text()
        .map(|text| text.trim().to_string())
        .ok_or_else(|| SgptError::NoResponseGenerated("response contained no candidates".into()))
}

/// Gemini adapter
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    transport: HttpTransport,
    api_key: SecretString,
    base_url: String,
}

impl GeminiProvider {
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

    fn endpoint(&self, model: &str, stream: bool) -> String {
        let method = if stream {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        format!(
            "{}/v1beta/models/{}:{}",
            self.base_url,
            urlencoding::encode(model),
            method
        )
    }

    async fn send(
        &self,
        request: &Request,
        stream: bool,
    ) -> Result<reqwest::Response, SgptError> {
        let payload = build_payload(request).await?;
        dump_json("Google Gemini request payload", &payload);

        let mut builder = self.transport.post(&self.endpoint(&request.model, stream));
        if stream {
            builder = builder
                .query(&[("alt", "sse")])
                .header(reqwest::header::ACCEPT, "text/event-stream");
        }
        let builder = builder
            .query(&[("key", self.api_key.expose_secret())])
            .json(&payload);
        self.transport.send(builder).await
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
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
        stream_to_output(&self.transport, response, &GeminiEventConverter, out).await
    }
}
