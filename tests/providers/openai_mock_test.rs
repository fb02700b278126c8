//! OpenAI adapter against a mock server: request shape, headers, response
//! extraction and error envelopes.

use std::io::Write;

use secrecy::SecretString;
use serde_json::{Value, json};
use sgpt::error::{ErrorCategory, SgptError};
use sgpt::providers::OpenAiProvider;
use sgpt::traits::LlmProvider;
use sgpt::transport::HttpTransport;
use sgpt::types::Request;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::load_sse_fixture_text;

fn provider(server: &MockServer) -> OpenAiProvider {
    OpenAiProvider::new(
        HttpTransport::new().unwrap(),
        SecretString::from("test-key".to_string()),
    )
    .with_base_url(server.uri())
}

async fn last_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    serde_json::from_slice(&requests.last().unwrap().body).unwrap()
}

#[tokio::test]
async fn complete_returns_trimmed_message_content() {
    let server = MockServer::start().await;
    let body = json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "\n  X  \n"}, "finish_reason": "stop"}]
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "gpt-4", "stream": false, "temperature": 0.5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .complete(&Request::new("gpt-4", "say X").with_instruction("be exact"))
        .await
        .unwrap();

    assert_eq!(response.text, "X");
    assert_eq!(serde_json::from_slice::<Value>(&response.raw).unwrap(), body);
    assert_eq!(
        last_body(&server).await["messages"],
        json!([
            {"role": "system", "content": "be exact"},
            {"role": "user", "content": "say X"}
        ])
    );
}

#[tokio::test]
async fn legacy_model_uses_completions_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_partial_json(json!({"model": "text-davinci-003", "prompt": "translate hola"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"choices": [{"text": "\n\nhello"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .complete(&Request::new("text-davinci-003", "hola").with_instruction("translate"))
        .await
        .unwrap();
    assert_eq!(response.text, "hello");
}

#[tokio::test]
async fn zero_choices_is_no_response_generated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = provider(&server)
        .complete(&Request::new("gpt-3.5-turbo", "hi"))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NoResponseGenerated);
}

#[tokio::test]
async fn error_envelope_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .complete(&Request::new("gpt-4", "hi"))
        .await
        .unwrap_err();
    match err {
        SgptError::ApiRequestFailed { status, message } => {
            assert_eq!(status, Some(401));
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .complete(&Request::new("gpt-4", "hi"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "API request failed: status 503");
}

#[tokio::test]
async fn stream_writes_fragments_then_newline() {
    let server = MockServer::start().await;
    let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n\
               data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\n\
               data: [DONE]\n\n";
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("accept", "text/event-stream"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    provider(&server)
        .stream_complete(&Request::new("gpt-4", "hi").with_stream(true), &mut out)
        .await
        .unwrap();
    assert_eq!(out, b"ab\n");
}

#[tokio::test]
async fn stream_replays_recorded_fixture() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(load_sse_fixture_text("openai", "chat_stream.sse"), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let mut out = Vec::new();
    provider(&server)
        .stream_complete(&Request::new("gpt-4o", "greet"), &mut out)
        .await
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "Hello, world\n");
}

#[tokio::test]
async fn stream_handshake_error_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "type": "requests"}
        })))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let err = provider(&server)
        .stream_complete(&Request::new("gpt-4", "hi"), &mut out)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert!(err.to_string().contains("Rate limit reached"));
    assert!(out.is_empty());
}

#[tokio::test]
async fn image_url_passes_through_unmodified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "a cat"}}]
        })))
        .mount(&server)
        .await;

    let request = Request::new("gpt-4o", "what is this")
        .with_image(Some("https://example.com/a.jpg".to_string()));
    provider(&server).complete(&request).await.unwrap();

    let body = last_body(&server).await;
    assert_eq!(
        body["messages"][0]["content"][1],
        json!({"type": "image_url", "image_url": {"url": "https://example.com/a.jpg"}})
    );
}

#[tokio::test]
async fn local_image_and_audio_are_inlined_as_data_uris() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .mount(&server)
        .await;

    let mut image = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    image
        .write_all(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
        .unwrap();
    let mut audio = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
    audio.write_all(b"abc").unwrap();

    let request = Request::new("gpt-4o", "")
        .with_image(Some(image.path().to_str().unwrap().to_string()))
        .with_audio(Some(audio.path().to_str().unwrap().to_string()));
    provider(&server).complete(&request).await.unwrap();

    let body = last_body(&server).await;
    let parts = body["messages"][0]["content"].as_array().unwrap().clone();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["image_url"]["url"], "data:image/png;base64,iVBORw0KGgo=");
    assert_eq!(parts[1]["type"], "audio");
    assert!(
        parts[1]["audio"]["data"]
            .as_str()
            .unwrap()
            .ends_with(";base64,YWJj")
    );
}

#[tokio::test]
async fn unsupported_model_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server)
        .complete(&Request::new("gpt-5-imaginary", "hi"))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::UnsupportedModel);
}

#[tokio::test]
async fn missing_image_file_is_an_io_error() {
    let server = MockServer::start().await;
    let err = provider(&server)
        .complete(
            &Request::new("gpt-4o", "hi").with_image(Some("/no/such/image.png".to_string())),
        )
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Io);
}
