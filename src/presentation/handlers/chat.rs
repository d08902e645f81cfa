use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use std::time::Duration;

use crate::application::ports::LlmClient;
use crate::application::services::{ChatRequest, ChatServiceError};
use crate::domain::{ConversationId, ModelMessage};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::api_types::{ChatRequestBody, UiStreamChunk};
use super::error::{ApiError, parse_conversation_id, parse_json_body};

pub const CONVERSATION_ID_HEADER: &str = "x-conversation-id";

const DONE_MARKER: &str = "[DONE]";

#[tracing::instrument(
    skip(state, body),
    fields(messages = tracing::field::Empty, conversation_id = tracing::field::Empty)
)]
pub async fn chat_handler<L>(State(state): State<AppState<L>>, body: Bytes) -> Response
where
    L: LlmClient + 'static,
{
    let request: ChatRequestBody = match parse_json_body(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Chat request with malformed body");
            return e.into_response();
        }
    };

    let span = tracing::Span::current();
    span.record("messages", request.messages.len());
    if let Some(raw) = request.conversation_id.as_deref() {
        span.record("conversation_id", raw);
    }

    let conversation_id: Option<ConversationId> = match request
        .conversation_id
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
    {
        Some(raw) => match parse_conversation_id(raw) {
            Ok(id) => Some(id),
            Err(e) => return e.into_response(),
        },
        None => None,
    };

    if request.messages.is_empty() {
        tracing::warn!("Chat request without messages");
        return ApiError::bad_request("No messages provided").into_response();
    }

    let messages = match request
        .messages
        .iter()
        .map(ModelMessage::try_from)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(messages) => messages,
        Err(e) => return ApiError::bad_request(e).into_response(),
    };

    if let Some(latest) = messages
        .iter()
        .rev()
        .find(|m| matches!(m, ModelMessage::User { .. }))
    {
        tracing::debug!(prompt = %sanitize_prompt(latest.content()), "Processing chat message");
    }

    let session = match state
        .chat_service
        .start_chat(ChatRequest {
            conversation_id,
            messages,
        })
        .await
    {
        Ok(session) => session,
        Err(ChatServiceError::NoUserMessage) => {
            tracing::warn!("Chat request with empty user message");
            return ApiError::bad_request("No user message provided").into_response();
        }
        Err(ChatServiceError::ConversationNotFound(id)) => {
            return ApiError::conversation_not_found(id).into_response();
        }
    };

    tracing::info!(
        conversation_id = ?session.conversation_id.map(|id| id.to_string()),
        message_id = %session.message_id,
        "Streaming chat response"
    );

    let keep_alive_seconds = state.settings.llm.sse_keep_alive_seconds.max(1);
    let mut events = session.events;

    let sse_stream = async_stream::stream! {
        while let Some(event) = events.recv().await {
            let chunk = UiStreamChunk::from(event);
            let chunk_json = serde_json::to_string(&chunk).unwrap_or_default();
            yield Ok::<_, Infallible>(Event::default().data(chunk_json));
        }
        yield Ok(Event::default().data(DONE_MARKER));
    };

    let mut response = Sse::new(sse_stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(keep_alive_seconds))
                .text("keep-alive"),
        )
        .into_response();

    if let Some(id) = session.conversation_id {
        if let Ok(header_value) = HeaderValue::from_str(&id.to_string()) {
            response
                .headers_mut()
                .insert(CONVERSATION_ID_HEADER, header_value);
        }
    }

    response
}
