use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use futures::StreamExt;
use serde_json::json;
use tokio::net::TcpListener;

use colloquy::application::ports::{
    FinishReason, LlmClient, LlmClientError, LlmEvent, ToolSpec,
};
use colloquy::domain::ModelMessage;
use colloquy::infrastructure::llm::create_streaming_llm_client;
use colloquy::presentation::config::LlmSettings;

const TOOL_CALL_STREAM: &str = concat!(
    "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"Checking\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"type\":\"function\",\"function\":{\"name\":\"weather\",\"arguments\":\"\"}}]}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"{\\\"location\\\":\"}}]}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"\\\"Oslo\\\"}\"}}]}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n\n",
    "data: [DONE]\n\n",
);

const TEXT_STREAM: &str = concat!(
    "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
    ": ping\n\n",
    "data: not-json\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    "data: [DONE]\n\n",
);

fn settings(provider: &str, base_url: Option<String>) -> LlmSettings {
    LlmSettings {
        provider: provider.to_string(),
        api_key: "test-key".to_string(),
        base_url,
        azure_endpoint: None,
        azure_api_version: None,
        chat_model: "test-model".to_string(),
        max_tokens: 256,
        temperature: 0.0,
        sse_keep_alive_seconds: 15,
    }
}

async fn serve(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || async move {
            (status, [(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{}/v1", addr)
}

async fn collect(client: &impl LlmClient, tools: &[ToolSpec]) -> Vec<LlmEvent> {
    let mut stream = client
        .stream_chat(&[ModelMessage::user("Weather in Oslo?")], tools)
        .await
        .expect("stream");
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event.expect("event"));
    }
    events
}

#[tokio::test]
async fn given_streamed_tool_call_when_reading_then_emits_assembled_call_before_finish() {
    let base_url = serve(StatusCode::OK, TOOL_CALL_STREAM).await;
    let client = create_streaming_llm_client(&settings("openai", Some(base_url))).expect("client");
    let tools = vec![ToolSpec {
        name: "weather".to_string(),
        description: "Get the weather".to_string(),
        parameters: json!({ "type": "object" }),
    }];

    let events = collect(&client, &tools).await;

    assert_eq!(events.len(), 3);
    assert_eq!(events[0], LlmEvent::TextDelta("Checking".to_string()));
    match &events[1] {
        LlmEvent::ToolCall(call) => {
            assert_eq!(call.id, "call_1");
            assert_eq!(call.name, "weather");
            assert_eq!(call.arguments, json!({ "location": "Oslo" }));
        }
        other => panic!("expected tool call, got {:?}", other),
    }
    assert_eq!(events[2], LlmEvent::Finish(FinishReason::ToolCalls));
}

#[tokio::test]
async fn given_text_stream_with_noise_when_reading_then_skips_bad_chunks() {
    let base_url = serve(StatusCode::OK, TEXT_STREAM).await;
    let client = create_streaming_llm_client(&settings("lmstudio", Some(base_url))).expect("client");

    let events = collect(&client, &[]).await;

    assert_eq!(
        events,
        vec![
            LlmEvent::TextDelta("Hello".to_string()),
            LlmEvent::TextDelta(" world".to_string()),
            LlmEvent::Finish(FinishReason::Stop),
        ]
    );
}

#[tokio::test]
async fn given_rate_limited_upstream_when_streaming_then_returns_rate_limited() {
    let base_url = serve(StatusCode::TOO_MANY_REQUESTS, "slow down").await;
    let client = create_streaming_llm_client(&settings("openai", Some(base_url))).expect("client");

    let result = client
        .stream_chat(&[ModelMessage::user("Hi")], &[])
        .await;

    assert!(matches!(result, Err(LlmClientError::RateLimited)));
}

#[tokio::test]
async fn given_server_error_when_streaming_then_returns_request_failure_with_status() {
    let base_url = serve(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
    let client = create_streaming_llm_client(&settings("openai", Some(base_url))).expect("client");

    let result = client
        .stream_chat(&[ModelMessage::user("Hi")], &[])
        .await;

    match result {
        Err(LlmClientError::ApiRequestFailed(message)) => assert!(message.contains("500")),
        other => panic!("expected request failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn given_local_provider_without_base_url_when_creating_client_then_returns_configuration_error() {
    let result = create_streaming_llm_client(&settings("ollama", None));

    assert!(matches!(result, Err(LlmClientError::Configuration(_))));
}

#[test]
fn given_unknown_provider_when_creating_client_then_returns_configuration_error() {
    let result = create_streaming_llm_client(&settings("carrier-pigeon", None));

    assert!(matches!(result, Err(LlmClientError::Configuration(_))));
}

#[test]
fn given_azure_without_endpoint_when_creating_client_then_returns_configuration_error() {
    let result = create_streaming_llm_client(&settings("azure", None));

    assert!(matches!(result, Err(LlmClientError::Configuration(_))));
}
