use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::application::services::ChatEvent;
use crate::domain::{Conversation, Message, MessageRole, ModelMessage, ToolInvocation, User};

/// A message as the browser sends it.
///
/// Text may arrive as `parts`, `content` or `text`; the first non-empty
/// source in that order wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiMessage {
    #[serde(default)]
    pub id: Option<String>,
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub parts: Vec<UiMessagePart>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiMessagePart {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl UiMessage {
    pub fn text(&self) -> String {
        let from_parts: String = self
            .parts
            .iter()
            .filter_map(|part| match part {
                UiMessagePart::Text { text } => Some(text.as_str()),
                UiMessagePart::Other => None,
            })
            .collect();

        if !from_parts.is_empty() {
            return from_parts;
        }

        self.content
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(self.text.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

impl TryFrom<&UiMessage> for ModelMessage {
    type Error = String;

    fn try_from(message: &UiMessage) -> Result<Self, Self::Error> {
        let role = message.role.parse::<MessageRole>()?;
        let text = message.text();

        match role {
            MessageRole::System => Ok(ModelMessage::system(text)),
            MessageRole::User => Ok(ModelMessage::user(text)),
            MessageRole::Assistant => Ok(ModelMessage::assistant(text)),
            MessageRole::Tool => Err("Tool messages cannot be sent by clients".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    pub messages: Vec<UiMessage>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConversationRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConversationsQuery {
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Uuid,
    pub title: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id.as_uuid(),
            title: conversation.title,
            user_id: conversation.user_id.as_i64(),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_invocations: Option<Vec<ToolInvocation>>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.as_uuid(),
            conversation_id: message.conversation_id.as_uuid(),
            role: message.role.as_str(),
            content: message.content,
            tool_invocations: (!message.tool_invocations.is_empty())
                .then_some(message.tool_invocations),
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetailResponse {
    pub conversation: ConversationResponse,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationEnvelope {
    pub conversation: ConversationResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i64(),
            name: user.name,
            age: user.age,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

/// One server-sent event of the chat stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiStreamChunk {
    #[serde(rename_all = "camelCase")]
    Start { message_id: Uuid },
    TextDelta { delta: String },
    #[serde(rename_all = "camelCase")]
    ToolInputAvailable {
        tool_call_id: String,
        tool_name: String,
        input: Value,
    },
    #[serde(rename_all = "camelCase")]
    ToolOutputAvailable { tool_call_id: String, output: Value },
    #[serde(rename_all = "camelCase")]
    Error { error_text: String },
    Finish,
}

impl From<ChatEvent> for UiStreamChunk {
    fn from(event: ChatEvent) -> Self {
        match event {
            ChatEvent::Start { message_id } => UiStreamChunk::Start {
                message_id: message_id.as_uuid(),
            },
            ChatEvent::TextDelta(delta) => UiStreamChunk::TextDelta { delta },
            ChatEvent::ToolInputAvailable {
                tool_call_id,
                tool_name,
                input,
            } => UiStreamChunk::ToolInputAvailable {
                tool_call_id,
                tool_name,
                input,
            },
            ChatEvent::ToolOutputAvailable {
                tool_call_id,
                output,
            } => UiStreamChunk::ToolOutputAvailable {
                tool_call_id,
                output,
            },
            ChatEvent::Error(error_text) => UiStreamChunk::Error { error_text },
            ChatEvent::Finish => UiStreamChunk::Finish,
        }
    }
}
