//! Anthropic Messages stream decoding
//!
//! Text arrives only in `content_block_delta` events. The event name from
//! the `event:` line gates which payloads are read; servers that omit the
//! name are matched on the JSON `type` instead.

use eventsource_stream::Event;

use super::types::AnthropicStreamEvent;
use crate::error::SgptError;
use crate::streaming::{DONE_SENTINEL, DecodedEvent, StreamDecoder};

const CONTENT_BLOCK_DELTA: &str = "content_block_delta";
const MESSAGE_STOP: &str = "message_stop";
const ERROR: &str = "error";
/// Name eventsource-stream assigns when the `event:` line is absent.
const UNNAMED: &str = "message";

#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicEventConverter;

impl StreamDecoder for AnthropicEventConverter {
    fn provider_id(&self) -> &'static str {
        "anthropic"
    }

    fn decode(&self, event: &Event) -> Result<DecodedEvent, SgptError> {
        let data = event.data.trim();
        if data == DONE_SENTINEL {
            return Ok(DecodedEvent::done());
        }

        let name = event.event.as_str();
        match name {
            MESSAGE_STOP => return Ok(DecodedEvent::done()),
            CONTENT_BLOCK_DELTA | ERROR | UNNAMED | "" => {}
            // message_start, content_block_start, ping, ...
            _ => return Ok(DecodedEvent::skip()),
        }

        let parsed: AnthropicStreamEvent = serde_json::from_str(data)
            .map_err(|e| SgptError::NoResponseGenerated(format!("invalid stream event: {e}")))?;

        match parsed.event_type.as_str() {
            CONTENT_BLOCK_DELTA => Ok(DecodedEvent::text(
                parsed.delta.and_then(|d| d.text).unwrap_or_default(),
            )),
            MESSAGE_STOP => Ok(DecodedEvent::done()),
            ERROR => {
                let message = parsed
                    .error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "unknown error".to_string());
                Err(SgptError::NoResponseGenerated(format!("stream error: {message}")))
            }
            _ => Ok(DecodedEvent::skip()),
        }
    }
}
