//! Unified request/response model shared by every adapter.

/// One generation request, built per input chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// System-level directive; empty when not configured.
    pub instruction: String,
    /// User text. May be empty when the request is media-only.
    pub input: String,
    pub temperature: f64,
    /// Vendor-specific model identifier.
    pub model: String,
    /// Local path or `http(s)://` URL of an image.
    pub image_path: Option<String>,
    /// Local path of an audio clip.
    pub audio_path: Option<String>,
    /// Whether incremental delivery was requested.
    pub stream: bool,
}

impl Request {
    pub fn new(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            instruction: String::new(),
            input: input.into(),
            temperature: 0.5,
            model: model.into(),
            image_path: None,
            audio_path: None,
            stream: false,
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_image(mut self, path: Option<String>) -> Self {
        self.image_path = path;
        self
    }

    pub fn with_audio(mut self, path: Option<String>) -> Self {
        self.audio_path = path;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// True when an image or audio attachment is present.
    pub fn has_media(&self) -> bool {
        self.image_path.is_some() || self.audio_path.is_some()
    }
}

/// Result of a non-streaming call.
#[derive(Debug, Clone)]
pub struct Response {
    /// Trimmed generated content.
    pub text: String,
    /// Exact response body, kept for diagnostics.
    pub raw: Vec<u8>,
}

impl Response {
    pub fn new(text: impl Into<String>, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            text: text.into(),
            raw: raw.into(),
        }
    }
}
