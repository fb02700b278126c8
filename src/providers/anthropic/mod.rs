//! Anthropic provider (Messages API)

pub mod client;
pub mod streaming;
pub mod types;

pub use client::AnthropicProvider;
pub use streaming::AnthropicEventConverter;
