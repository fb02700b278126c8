//! Registry, runner and transport behaviour end to end against a mock server.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use sgpt::capabilities;
use sgpt::config::{Config, ProviderKind};
use sgpt::error::{ErrorCategory, SgptError};
use sgpt::input::split_chunks;
use sgpt::providers::OpenAiProvider;
use sgpt::registry::ProviderRegistry;
use sgpt::runner;
use sgpt::traits::LlmProvider;
use sgpt::transport::{HttpTransport, TransportConfig};
use sgpt::types::Request;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(model: &str) -> Config {
    let mut config = Config {
        api_key: SecretString::from("test-key".to_string()),
        model: Some(model.to_string()),
        ..Config::default()
    };
    config.validate().unwrap();
    config
}

fn registry_for(server: &MockServer, transport: HttpTransport) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(
        ProviderKind::OpenAi,
        Arc::new(
            OpenAiProvider::new(transport, SecretString::from("test-key".to_string()))
                .with_base_url(server.uri()),
        ),
    );
    registry
}

#[tokio::test]
async fn each_chunk_is_one_request_in_order() {
    let server = MockServer::start().await;
    for (input, reply) in [("one", "1"), ("two", "2")] {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"prompt": format!(" {input}")})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"choices": [{"text": reply}]})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = config("text-davinci-002");
    assert!(!config.model_capabilities.streaming);

    let registry = registry_for(&server, HttpTransport::new().unwrap());
    let provider = registry.get("openai").unwrap();
    let chunks = split_chunks("one\n\n two \n", &config.separator, false);

    let mut out = Vec::new();
    let n = runner::run(provider.as_ref(), &config, &chunks, &mut out)
        .await
        .unwrap();
    assert_eq!(n, 2);
    assert_eq!(String::from_utf8(out).unwrap(), "1\n2\n");
}

#[tokio::test]
async fn streaming_capability_selects_stream_complete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"choices\":[{\"delta\":{\"content\":\"hi\"},\"finish_reason\":\"stop\"}]}\n\n",
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = config("gpt-3.5-turbo");
    let registry = registry_for(&server, HttpTransport::new().unwrap());
    let provider = registry.get("openai").unwrap();

    let mut out = Vec::new();
    runner::run(provider.as_ref(), &config, &["hello".to_string()], &mut out)
        .await
        .unwrap();
    assert_eq!(out, b"hi\n");
}

#[tokio::test]
async fn failure_aborts_remaining_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": {"message": "boom"}})))
        .expect(1)
        .mount(&server)
        .await;

    let config = config("text-ada-001");
    let registry = registry_for(&server, HttpTransport::new().unwrap());
    let provider = registry.get("openai").unwrap();

    let chunks: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let mut out = Vec::new();
    let err = runner::run(provider.as_ref(), &config, &chunks, &mut out)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(out.is_empty());
}

#[tokio::test]
async fn slow_handshake_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({"choices": [{"text": "late"}]})),
        )
        .mount(&server)
        .await;

    let transport = HttpTransport::with_config(TransportConfig {
        request_timeout: Duration::from_millis(200),
        ..TransportConfig::default()
    })
    .unwrap();
    let provider = OpenAiProvider::new(transport, SecretString::from("k".to_string()))
        .with_base_url(server.uri());

    let err = provider
        .complete(&Request::new("text-ada-001", "hi"))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ApiRequestFailed);
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn one_deadline_covers_headers_and_body() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Headers after 250 ms, body after 500 ms: each step fits in 400 ms, the sum does not.
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let _ = socket.read(&mut buf).await;
        let body = r#"{"choices":[{"text":"late"}]}"#;
        tokio::time::sleep(Duration::from_millis(250)).await;
        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        let _ = socket.write_all(body.as_bytes()).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
    });

    let transport = HttpTransport::with_config(TransportConfig {
        request_timeout: Duration::from_millis(400),
        ..TransportConfig::default()
    })
    .unwrap();
    let provider = OpenAiProvider::new(transport, SecretString::from("k".to_string()))
        .with_base_url(format!("http://{addr}"));

    let err = provider
        .complete(&Request::new("text-ada-001", "hi"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), None);
    assert!(err.to_string().contains("timed out"), "{err}");
}

#[tokio::test]
async fn cancellation_aborts_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({"choices": [{"text": "late"}]})),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let transport = HttpTransport::with_config(TransportConfig {
        request_timeout: Duration::from_secs(30),
        ..TransportConfig::default()
    })
    .unwrap()
    .with_cancellation(token.clone());
    let provider = OpenAiProvider::new(transport, SecretString::from("k".to_string()))
        .with_base_url(server.uri());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let err = provider
        .complete(&Request::new("text-ada-001", "hi"))
        .await
        .unwrap_err();
    canceller.await.unwrap();
    assert!(matches!(err, SgptError::Cancelled));
    assert_eq!(err.exit_code(), 130);
}

#[test]
fn every_table_model_belongs_to_exactly_one_adapter() {
    use sgpt::providers::{anthropic, gemini, openai};

    let mut rosters: Vec<&str> = Vec::new();
    rosters.extend(openai::client::MULTIMODAL_MODELS);
    rosters.extend(openai::client::CHAT_MODELS);
    rosters.extend(openai::client::LEGACY_MODELS);
    rosters.extend(anthropic::client::SUPPORTED_MODELS);
    rosters.extend(gemini::client::SUPPORTED_MODELS);
    rosters.sort_unstable();

    assert_eq!(rosters, capabilities::known_models());
}
