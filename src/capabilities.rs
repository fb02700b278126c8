//! Static model capability table.
//!
//! This table is the only place that decides which models accept image/audio
//! input and which support incremental delivery. It is consulted during
//! configuration validation, before any request is sent.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::config::ProviderKind;

/// What a model can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelCapabilities {
    /// Accepts image and/or audio input.
    pub multimodal: bool,
    /// Supports server-sent-event delivery.
    pub streaming: bool,
}

impl ModelCapabilities {
    pub const fn new(multimodal: bool, streaming: bool) -> Self {
        Self {
            multimodal,
            streaming,
        }
    }
}

lazy_static! {
    static ref MODEL_CAPABILITIES: HashMap<&'static str, ModelCapabilities> = {
        let mut m = HashMap::new();
        // OpenAI
        m.insert("gpt-4o", ModelCapabilities::new(true, true));
        m.insert("gpt-4o-mini", ModelCapabilities::new(true, true));
        m.insert("gpt-4", ModelCapabilities::new(false, true));
        m.insert("gpt-4-0314", ModelCapabilities::new(false, true));
        m.insert("gpt-4-32k", ModelCapabilities::new(false, true));
        m.insert("gpt-4-32k-0314", ModelCapabilities::new(false, true));
        m.insert("gpt-3.5-turbo", ModelCapabilities::new(false, true));
        m.insert("text-davinci-003", ModelCapabilities::new(false, false));
        m.insert("text-davinci-002", ModelCapabilities::new(false, false));
        m.insert("text-curie-001", ModelCapabilities::new(false, false));
        m.insert("text-babbage-001", ModelCapabilities::new(false, false));
        m.insert("text-ada-001", ModelCapabilities::new(false, false));
        // Anthropic (text only in this client)
        m.insert("claude-v1", ModelCapabilities::new(false, true));
        m.insert("claude-v1.2", ModelCapabilities::new(false, true));
        m.insert("claude-3-haiku-20240307", ModelCapabilities::new(false, true));
        m.insert("claude-3-5-sonnet-20240620", ModelCapabilities::new(false, true));
        // Google
        m.insert("gemini-medium", ModelCapabilities::new(true, true));
        m.insert("gemini-large", ModelCapabilities::new(true, true));
        m.insert("gemini-1.5-flash", ModelCapabilities::new(true, true));
        m.insert("gemini-1.5-pro", ModelCapabilities::new(true, true));
        m
    };
}

/// Look up a model. Unknown identifiers return `None`; callers must treat
/// that as a hard error rather than guessing.
pub fn lookup(model: &str) -> Option<ModelCapabilities> {
    MODEL_CAPABILITIES.get(model).copied()
}

/// Every model identifier in the table, sorted.
pub fn known_models() -> Vec<&'static str> {
    let mut models: Vec<_> = MODEL_CAPABILITIES.keys().copied().collect();
    models.sort_unstable();
    models
}

/// Model used when the configuration does not name one.
pub const fn default_model(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::OpenAi => "gpt-3.5-turbo",
        ProviderKind::Anthropic => "claude-v1",
        ProviderKind::Google => "gemini-medium",
    }
}
