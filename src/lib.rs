//! # sgpt
//!
//! Send chunks of text, optionally with an image or audio clip, to a hosted
//! language model and print the reply. OpenAI, Anthropic and Google Gemini
//! are supported behind one [`LlmProvider`] contract.
//!
#![deny(unsafe_code)]

//! ## Quick Start
//!
//! ```rust,no_run
//! use secrecy::SecretString;
//! use sgpt::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SgptError> {
//!     let transport = HttpTransport::new()?;
//!     let provider = OpenAiProvider::new(transport, SecretString::from("sk-...".to_string()));
//!
//!     let request = Request::new("gpt-4", "Hello, world!").with_instruction("Answer briefly");
//!     let response = provider.complete(&request).await?;
//!     println!("{}", response.text);
//!     Ok(())
//! }
//! ```

pub mod capabilities;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod providers;
pub mod registry;
pub mod runner;
pub mod streaming;
pub mod traits;
pub mod transport;
pub mod types;
pub mod utils;

pub use error::SgptError;

pub mod prelude {
    pub use crate::capabilities::ModelCapabilities;
    pub use crate::config::{Config, ProviderKind};
    pub use crate::error::{ErrorCategory, SgptError};
    pub use crate::providers::{AnthropicProvider, GeminiProvider, OpenAiProvider};
    pub use crate::registry::ProviderRegistry;
    pub use crate::traits::LlmProvider;
    pub use crate::transport::{HttpTransport, TransportConfig};
    pub use crate::types::{Request, Response};
}
