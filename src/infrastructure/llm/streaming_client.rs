use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::application::ports::{
    FinishReason, LlmClient, LlmClientError, LlmEvent, LlmEventStream, ToolSpec,
};
use crate::domain::{ModelMessage, ToolCall};
use crate::presentation::config::LlmSettings;

use super::{SseLineDecoder, ToolCallAccumulator};

const DONE_MARKER: &str = "[DONE]";

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct StreamingLlmClient {
    client: Client,
    provider: String,
    base_url: String,
    api_key: String,
    api_version: Option<String>,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    max_tokens: usize,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize)]
struct WireToolCall {
    id: String,
    r#type: &'static str,
    function: WireFunctionCall,
}

#[derive(Serialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct WireTool<'a> {
    r#type: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    index: usize,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionDelta>,
}

#[derive(Deserialize)]
struct FunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

impl From<&ModelMessage> for WireMessage {
    fn from(message: &ModelMessage) -> Self {
        match message {
            ModelMessage::System { content } => WireMessage {
                role: "system",
                content: Some(content.clone()),
                tool_calls: Vec::new(),
                tool_call_id: None,
            },
            ModelMessage::User { content } => WireMessage {
                role: "user",
                content: Some(content.clone()),
                tool_calls: Vec::new(),
                tool_call_id: None,
            },
            ModelMessage::Assistant {
                content,
                tool_calls,
            } => WireMessage {
                role: "assistant",
                content: if content.is_empty() && !tool_calls.is_empty() {
                    None
                } else {
                    Some(content.clone())
                },
                tool_calls: tool_calls.iter().map(WireToolCall::from).collect(),
                tool_call_id: None,
            },
            ModelMessage::Tool {
                tool_call_id,
                content,
            } => WireMessage {
                role: "tool",
                content: Some(content.clone()),
                tool_calls: Vec::new(),
                tool_call_id: Some(tool_call_id.clone()),
            },
        }
    }
}

impl From<&ToolCall> for WireToolCall {
    fn from(call: &ToolCall) -> Self {
        WireToolCall {
            id: call.id.clone(),
            r#type: "function",
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.to_string(),
            },
        }
    }
}

impl StreamingLlmClient {
    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.provider == "azure" {
            request.header("api-key", &self.api_key)
        } else {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }

    fn completions_url(&self) -> String {
        match &self.api_version {
            Some(version) => format!(
                "{}/chat/completions?api-version={}",
                self.base_url, version
            ),
            None => format!("{}/chat/completions", self.base_url),
        }
    }
}

#[async_trait]
impl LlmClient for StreamingLlmClient {
    #[instrument(
        skip(self, messages, tools),
        fields(model = %self.model, messages = messages.len(), tools = tools.len())
    )]
    async fn stream_chat(
        &self,
        messages: &[ModelMessage],
        tools: &[ToolSpec],
    ) -> Result<LlmEventStream, LlmClientError> {
        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            tools: tools
                .iter()
                .map(|tool| WireTool {
                    r#type: "function",
                    function: WireFunction {
                        name: &tool.name,
                        description: &tool.description,
                        parameters: &tool.parameters,
                    },
                })
                .collect(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: true,
        };

        let request = self.client.post(self.completions_url()).json(&request_body);
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let mut bytes = response.bytes_stream();
        let event_stream = async_stream::stream! {
            let mut decoder = SseLineDecoder::new();
            let mut tool_calls = ToolCallAccumulator::new();
            let mut finished = false;
            let mut done = false;

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err::<LlmEvent, LlmClientError>(LlmClientError::ApiRequestFailed(
                            e.to_string(),
                        ));
                        return;
                    }
                };
                for data in decoder.push(&chunk) {
                    if data == DONE_MARKER {
                        done = true;
                        break;
                    }
                    for event in parse_chunk(&data, &mut tool_calls) {
                        finished |= matches!(event, LlmEvent::Finish(_));
                        yield Ok(event);
                    }
                }
                if done {
                    break;
                }
            }

            if !done {
                if let Some(data) = decoder.finish().filter(|d| d != DONE_MARKER) {
                    for event in parse_chunk(&data, &mut tool_calls) {
                        finished |= matches!(event, LlmEvent::Finish(_));
                        yield Ok(event);
                    }
                }
            }

            for call in tool_calls.drain() {
                yield Ok(LlmEvent::ToolCall(call));
            }
            if !finished {
                yield Ok(LlmEvent::Finish(FinishReason::Stop));
            }
        };

        Ok(Box::pin(event_stream))
    }
}

/// Translates one streamed chunk. Tool calls are held in `tool_calls` until
/// the choice reports a finish reason.
fn parse_chunk(data: &str, tool_calls: &mut ToolCallAccumulator) -> Vec<LlmEvent> {
    let chunk = match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!(error = %e, "Skipping unparseable stream chunk");
            return Vec::new();
        }
    };

    let mut events = Vec::new();
    let Some(choice) = chunk.choices.into_iter().next() else {
        return events;
    };

    if let Some(delta) = choice.delta {
        if let Some(content) = delta.content.filter(|c| !c.is_empty()) {
            events.push(LlmEvent::TextDelta(content));
        }
        for call in delta.tool_calls.unwrap_or_default() {
            let (name, arguments) = match call.function {
                Some(function) => (function.name, function.arguments),
                None => (None, None),
            };
            tool_calls.push(
                call.index,
                call.id.as_deref(),
                name.as_deref(),
                arguments.as_deref(),
            );
        }
    }

    if let Some(reason) = choice.finish_reason {
        debug!(reason = %reason, "Stream reported finish");
        events.extend(tool_calls.drain().into_iter().map(LlmEvent::ToolCall));
        events.push(LlmEvent::Finish(FinishReason::parse(&reason)));
    }

    events
}

pub fn create_streaming_llm_client(
    settings: &LlmSettings,
) -> Result<StreamingLlmClient, LlmClientError> {
    let base_url = match settings.provider.as_str() {
        "openai" => settings
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        "deepseek" => settings
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.deepseek.com/v1".to_string()),
        "lmstudio" | "ollama" => settings.base_url.clone().ok_or_else(|| {
            LlmClientError::Configuration(format!(
                "base_url required for {} provider",
                settings.provider
            ))
        })?,
        "azure" => {
            let endpoint = settings.azure_endpoint.as_ref().ok_or_else(|| {
                LlmClientError::Configuration(
                    "azure_endpoint required for azure provider".to_string(),
                )
            })?;
            format!(
                "{}/openai/deployments/{}",
                endpoint.trim_end_matches('/'),
                settings.chat_model
            )
        }
        _ => {
            return Err(LlmClientError::Configuration(format!(
                "unknown provider: {}",
                settings.provider
            )));
        }
    };

    Ok(StreamingLlmClient {
        client: Client::new(),
        provider: settings.provider.clone(),
        base_url: base_url.trim_end_matches('/').to_string(),
        api_key: settings.api_key.clone(),
        api_version: settings
            .azure_api_version
            .clone()
            .filter(|_| settings.provider == "azure"),
        model: settings.chat_model.clone(),
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    })
}
