//! OpenAI chat completion stream decoding

use eventsource_stream::Event;

use super::types::ChatCompletionChunk;
use crate::error::SgptError;
use crate::streaming::{DONE_SENTINEL, DecodedEvent, StreamDecoder};

/// Reads `choices[0].delta.content`; ends on `[DONE]` or a non-empty `finish_reason`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiEventConverter;

impl StreamDecoder for OpenAiEventConverter {
    fn provider_id(&self) -> &'static str {
        "openai"
    }

    fn decode(&self, event: &Event) -> Result<DecodedEvent, SgptError> {
        let data = event.data.trim();
        if data == DONE_SENTINEL {
            return Ok(DecodedEvent::done());
        }

        let chunk: ChatCompletionChunk = serde_json::from_str(data)
            .map_err(|e| SgptError::NoResponseGenerated(format!("invalid stream chunk: {e}")))?;

        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(DecodedEvent::skip());
        };
        let finished = choice.finish_reason.is_some_and(|r| !r.is_empty());
        Ok(DecodedEvent::text(choice.delta.content.unwrap_or_default()).finishing(finished))
    }
}
