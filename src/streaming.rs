//! Server-sent-event stream decoding
//!
//! Each adapter supplies a [`StreamDecoder`] that turns one SSE event into
//! an optional text fragment and a termination flag. [`pump_stream`] drives
//! a decoder over an event stream and writes fragments to the output sink,
//! flushing after every fragment.

use std::fmt::Display;
use std::io::Write;

use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures_util::{Stream, StreamExt};

use crate::error::SgptError;

/// Sentinel some vendors send as the final `data:` payload.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Outcome of decoding one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Text to print, if the event carried any.
    pub text: Option<String>,
    /// True when the stream is complete after this event.
    pub finished: bool,
}

impl DecodedEvent {
    /// Event that carries nothing of interest.
    pub fn skip() -> Self {
        Self::default()
    }

    /// Terminal event with no text.
    pub fn done() -> Self {
        Self {
            text: None,
            finished: true,
        }
    }

    /// Text fragment; empty strings are dropped.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            text: (!text.is_empty()).then_some(text),
            finished: false,
        }
    }

    pub fn finishing(mut self, finished: bool) -> Self {
        self.finished |= finished;
        self
    }
}

/// Vendor-specific event decoding.
///
/// An `Err` means the event was malformed. The driver logs it and moves on;
/// it never fails the stream.
pub trait StreamDecoder: Send + Sync {
    /// Vendor name used in log messages.
    fn provider_id(&self) -> &'static str;

    fn decode(&self, event: &Event) -> Result<DecodedEvent, SgptError>;
}

/// Frame a raw response body as server-sent events.
///
/// Bytes that are not valid UTF-8 become U+FFFD before framing, so one bad
/// event reaches the decoder (and is skipped there) instead of stalling the
/// rest of the body. Errors from the byte source, or a line the SSE parser
/// rejects, end the stream.
pub fn sse_event_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<Event, SgptError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    lossy_utf8(bytes).eventsource().filter_map(|item| async move {
        match item {
            Ok(event) => Some(Ok(event)),
            Err(EventStreamError::Utf8(e)) => {
                tracing::warn!(error = %e, "skipping undecodable stream data");
                None
            }
            // The parser does not consume the offending line, so it cannot be skipped.
            Err(EventStreamError::Parser(e)) => Some(Err(SgptError::transport(format!(
                "error parsing event stream: {e:?}"
            )))),
            Err(EventStreamError::Transport(e)) => Some(Err(SgptError::transport(format!(
                "error reading stream: {e}"
            )))),
        }
    })
}

/// Decode chunks as UTF-8, carrying split code points into the next chunk.
fn lossy_utf8<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, E>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Send + 'static,
{
    let state = (Box::pin(bytes), Vec::<u8>::new(), false);
    futures_util::stream::unfold(state, |(mut bytes, mut carry, done)| async move {
        if done {
            return None;
        }
        match bytes.next().await {
            Some(Ok(chunk)) => {
                carry.extend_from_slice(chunk.as_ref());
                let text = drain_utf8(&mut carry);
                Some((Ok(text), (bytes, carry, false)))
            }
            Some(Err(e)) => Some((Err(e), (bytes, carry, false))),
            None if carry.is_empty() => None,
            None => {
                let text = String::from_utf8_lossy(&carry).into_owned();
                Some((Ok(text), (bytes, Vec::new(), true)))
            }
        }
    })
}

/// Take the decodable prefix of `buf`, replacing invalid sequences with
/// U+FFFD. An incomplete trailing sequence stays in `buf`.
fn drain_utf8(buf: &mut Vec<u8>) -> String {
    let mut out = String::new();
    let mut start = 0;
    while start < buf.len() {
        match std::str::from_utf8(&buf[start..]) {
            Ok(text) => {
                out.push_str(text);
                start = buf.len();
            }
            Err(e) => {
                let valid = start + e.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&buf[start..valid]));
                match e.error_len() {
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start = valid + len;
                    }
                    None => {
                        start = valid;
                        break;
                    }
                }
            }
        }
    }
    buf.drain(..start);
    out
}

/// Drive `events` through `decoder`, writing text to `out` as it arrives.
///
/// Returns after the decoder reports completion or the stream ends, then
/// writes a single trailing newline. Transport errors abort the stream.
pub async fn pump_stream<S, D>(
    mut events: S,
    decoder: &D,
    out: &mut (dyn Write + Send),
) -> Result<(), SgptError>
where
    S: Stream<Item = Result<Event, SgptError>> + Unpin,
    D: StreamDecoder + ?Sized,
{
    while let Some(event) = events.next().await {
        let event = event?;
        if event.data.trim().is_empty() {
            continue;
        }

        let decoded = match decoder.decode(&event) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(
                    provider = decoder.provider_id(),
                    error = %e,
                    data = %event.data,
                    "error parsing stream event"
                );
                continue;
            }
        };

        if let Some(text) = decoded.text {
            out.write_all(text.as_bytes())?;
            out.flush()?;
        }
        if decoded.finished {
            break;
        }
    }

    writeln!(out)?;
    out.flush()?;
    Ok(())
}
