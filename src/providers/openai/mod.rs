//! OpenAI provider
//!
//! Chat completions, legacy completions, and chat streaming.

pub mod client;
pub mod streaming;
pub mod types;

pub use client::OpenAiProvider;
pub use streaming::OpenAiEventConverter;
