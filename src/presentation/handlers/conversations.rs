use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::ports::LlmClient;
use crate::domain::{Conversation, DEFAULT_USER_ID, UserId};
use crate::presentation::state::AppState;

use super::api_types::{
    ConversationDetailResponse, ConversationEnvelope, ConversationResponse,
    CreateConversationRequest, DeleteResponse, ListConversationsQuery, MessageResponse,
    MessagesResponse, UpdateConversationRequest,
};
use super::error::{ApiError, parse_conversation_id, parse_json_body};

const MAX_TITLE_CHARS: usize = 255;

#[tracing::instrument(skip(state))]
pub async fn list_conversations_handler<L>(
    State(state): State<AppState<L>>,
    Query(query): Query<ListConversationsQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    L: LlmClient + 'static,
{
    let conversations = state
        .conversation_repository
        .list_conversations(query.user_id.map(UserId::new))
        .await
        .map_err(|e| ApiError::internal("Failed to fetch conversations", &e))?;

    let response: Vec<ConversationResponse> = conversations
        .into_iter()
        .map(ConversationResponse::from)
        .collect();

    Ok(Json(response))
}

/// The body is optional; an absent or blank title gets the default.
#[tracing::instrument(skip(state, body))]
pub async fn create_conversation_handler<L>(
    State(state): State<AppState<L>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
    L: LlmClient + 'static,
{
    let request: CreateConversationRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateConversationRequest::default()
    } else {
        parse_json_body(&body)?
    };

    let title = match request.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => validate_title(title)?,
        _ => state.settings.chat.default_title.clone(),
    };

    let conversation = Conversation::new(DEFAULT_USER_ID, title);
    state
        .conversation_repository
        .create_conversation(&conversation)
        .await
        .map_err(|e| ApiError::internal("Failed to create conversation", &e))?;

    tracing::info!(conversation_id = %conversation.id, "Conversation created");

    Ok((
        StatusCode::OK,
        Json(ConversationResponse::from(conversation)),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn get_conversation_handler<L>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    L: LlmClient + 'static,
{
    let conversation_id = parse_conversation_id(&id)?;

    let conversation = state
        .conversation_repository
        .get_conversation(conversation_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch conversation", &e))?
        .ok_or_else(|| ApiError::conversation_not_found(conversation_id))?;

    let messages = state
        .conversation_repository
        .get_messages(conversation_id, usize::MAX)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch conversation", &e))?;

    Ok(Json(ConversationDetailResponse {
        conversation: ConversationResponse::from(conversation),
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

#[tracing::instrument(skip(state, body))]
pub async fn update_conversation_handler<L>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
    L: LlmClient + 'static,
{
    let conversation_id = parse_conversation_id(&id)?;
    let request: UpdateConversationRequest = parse_json_body(&body)?;

    let title = match request.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => validate_title(title)?,
        _ => return Err(ApiError::bad_request("Title is required")),
    };

    let conversation = state
        .conversation_repository
        .update_title(conversation_id, &title)
        .await
        .map_err(|e| ApiError::internal("Failed to update conversation", &e))?
        .ok_or_else(|| ApiError::conversation_not_found(conversation_id))?;

    Ok(Json(ConversationEnvelope {
        conversation: ConversationResponse::from(conversation),
    }))
}

#[tracing::instrument(skip(state))]
pub async fn delete_conversation_handler<L>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    L: LlmClient + 'static,
{
    let conversation_id = parse_conversation_id(&id)?;

    let deleted = state
        .conversation_repository
        .delete_conversation(conversation_id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete conversation", &e))?;

    if !deleted {
        return Err(ApiError::conversation_not_found(conversation_id));
    }

    tracing::info!(conversation_id = %conversation_id, "Conversation deleted");
    Ok(Json(DeleteResponse { success: true }))
}

#[tracing::instrument(skip(state))]
pub async fn list_messages_handler<L>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    L: LlmClient + 'static,
{
    let conversation_id = parse_conversation_id(&id)?;

    state
        .conversation_repository
        .get_conversation(conversation_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch messages", &e))?
        .ok_or_else(|| ApiError::conversation_not_found(conversation_id))?;

    let messages = state
        .conversation_repository
        .get_messages(conversation_id, usize::MAX)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch messages", &e))?;

    Ok(Json(MessagesResponse {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

fn validate_title(title: &str) -> Result<String, ApiError> {
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::bad_request(format!(
            "Title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(title.to_string())
}
