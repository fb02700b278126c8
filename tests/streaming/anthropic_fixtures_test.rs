//! Anthropic Messages stream fixtures

use crate::support::replay_fixture;
use sgpt::providers::anthropic::AnthropicEventConverter;

#[tokio::test]
async fn only_content_block_deltas_are_printed() {
    let out = replay_fixture("anthropic", "messages_stream.sse", &AnthropicEventConverter).await;
    // Nothing after message_stop is written.
    assert_eq!(out, "Hello there!\n");
}

#[tokio::test]
async fn error_event_does_not_fail_the_stream() {
    let out = replay_fixture("anthropic", "error_mid_stream.sse", &AnthropicEventConverter).await;
    assert_eq!(out, "Partial answer\n");
}

#[tokio::test]
async fn unnamed_events_fall_back_to_json_type() {
    let out = replay_fixture("anthropic", "unnamed_events.sse", &AnthropicEventConverter).await;
    assert_eq!(out, "no names\n");
}
