//! Gemini `streamGenerateContent?alt=sse` decoding

use eventsource_stream::Event;

use super::types::GenerateContentResponse;
use crate::error::SgptError;
use crate::streaming::{DONE_SENTINEL, DecodedEvent, StreamDecoder};

/// Each event is a partial `GenerateContentResponse`. The stream ends at
/// `[DONE]` or when the server closes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiEventConverter;

impl StreamDecoder for GeminiEventConverter {
    fn provider_id(&self) -> &'static str {
        "google"
    }

    fn decode(&self, event: &Event) -> Result<DecodedEvent, SgptError> {
        let data = event.data.trim();
        if data == DONE_SENTINEL {
            return Ok(DecodedEvent::done());
        }

        let chunk: GenerateContentResponse = serde_json::from_str(data)
            .map_err(|e| SgptError::NoResponseGenerated(format!("invalid stream chunk: {e}")))?;
        Ok(chunk
            .first_text()
            .map(DecodedEvent::text)
            .unwrap_or_else(DecodedEvent::skip))
    }
}
