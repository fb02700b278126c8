//! Google Gemini provider

pub mod client;
pub mod streaming;
pub mod types;

pub use client::GeminiProvider;
pub use streaming::GeminiEventConverter;
