//! Run configuration
//!
//! [`Config`] holds the resolved run parameters. It is produced by
//! [`loader::load`] (flags > environment > file > defaults), validated once by
//! [`Config::validate`], and then treated as read-only for the rest of the run.

pub mod loader;

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};

use crate::capabilities::{self, ModelCapabilities};
use crate::error::SgptError;

pub const DEFAULT_TEMPERATURE: f64 = 0.5;
pub const DEFAULT_SEPARATOR: &str = "\n";

/// Supported vendors, by the name used on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Google,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [Self::OpenAi, Self::Anthropic, Self::Google];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = SgptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "google" => Ok(Self::Google),
            other => Err(SgptError::config(format!("unsupported provider: {other}"))),
        }
    }
}

/// Resolved run parameters.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: SecretString,
    pub provider: String,
    /// `None` until [`Config::validate`] assigns the provider default.
    pub model: Option<String>,
    /// Filled in by [`Config::validate`].
    pub model_capabilities: ModelCapabilities,
    pub instruction: String,
    pub temperature: f64,
    pub separator: String,
    pub image_path: Option<String>,
    pub audio_path: Option<String>,
    pub debug: bool,
    /// Positional words left over after flag parsing; when present they
    /// replace stdin as the input text.
    pub remaining_args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: SecretString::from(String::new()),
            provider: ProviderKind::OpenAi.as_str().to_string(),
            model: None,
            model_capabilities: ModelCapabilities::default(),
            instruction: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            separator: DEFAULT_SEPARATOR.to_string(),
            image_path: None,
            audio_path: None,
            debug: false,
            remaining_args: Vec::new(),
        }
    }
}

impl Config {
    /// Check the configuration, in a fixed order, stopping at the first problem:
    ///
    /// 1. API key present
    /// 2. provider recognised
    /// 3. model defaulted from the provider when unset
    /// 4. model present in the capability table
    /// 5. image/audio only with a multimodal model
    /// 6. temperature within `[0, 1]`
    pub fn validate(&mut self) -> Result<(), SgptError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(SgptError::config(
                "API key is required. Please provide it via --api_key flag, \
                 SGPT_API_KEY environment variable, or config file",
            ));
        }

        let provider: ProviderKind = self.provider.parse()?;

        let model = self
            .model
            .get_or_insert_with(|| capabilities::default_model(provider).to_string())
            .clone();

        let caps = capabilities::lookup(&model)
            .ok_or_else(|| SgptError::config(format!("unsupported model: {model}")))?;
        self.model_capabilities = caps;

        if self.has_media() && !caps.multimodal {
            return Err(SgptError::config(format!(
                "model {model} does not support multimodal inputs (image/audio)"
            )));
        }

        // NaN fails both comparisons, so test for containment.
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(SgptError::config(format!(
                "temperature must be between 0 and 1, got {}",
                self.temperature
            )));
        }

        Ok(())
    }

    /// Model identifier, empty before validation assigned a default.
    pub fn model_id(&self) -> &str {
        self.model.as_deref().unwrap_or_default()
    }

    pub fn has_media(&self) -> bool {
        self.image_path.is_some() || self.audio_path.is_some()
    }
}
