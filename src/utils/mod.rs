//! Utility helpers shared by the adapters.

pub mod media;
pub mod mime;
pub mod redact;
