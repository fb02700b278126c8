//! Provider registry
//!
//! Maps provider names to adapter instances. Populated once at startup and
//! read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use secrecy::SecretString;

use crate::config::ProviderKind;
use crate::error::SgptError;
use crate::providers::{AnthropicProvider, GeminiProvider, OpenAiProvider};
use crate::traits::LlmProvider;
use crate::transport::HttpTransport;

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    by_kind: HashMap<ProviderKind, Arc<dyn LlmProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.by_kind.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("providers", &names)
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All three vendors, sharing `transport` and `api_key`.
    pub fn with_defaults(transport: &HttpTransport, api_key: &SecretString) -> Self {
        let mut registry = Self::new();
        registry.register(
            ProviderKind::OpenAi,
            Arc::new(OpenAiProvider::new(transport.clone(), api_key.clone())),
        );
        registry.register(
            ProviderKind::Anthropic,
            Arc::new(AnthropicProvider::new(transport.clone(), api_key.clone())),
        );
        registry.register(
            ProviderKind::Google,
            Arc::new(GeminiProvider::new(transport.clone(), api_key.clone())),
        );
        registry
    }

    /// Register or replace the adapter for `kind`.
    pub fn register(&mut self, kind: ProviderKind, provider: Arc<dyn LlmProvider>) {
        self.by_kind.insert(kind, provider);
    }

    /// Look up by name. Unknown or unregistered names are configuration errors.
    pub fn get(&self, name: &str) -> Result<Arc<dyn LlmProvider>, SgptError> {
        let kind: ProviderKind = name.parse()?;
        self.by_kind
            .get(&kind)
            .cloned()
            .ok_or_else(|| SgptError::config(format!("provider {name} is not registered")))
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}
