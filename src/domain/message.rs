use super::{ConversationId, MessageId, MessageRole, ToolInvocation};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    pub tool_invocations: Vec<ToolInvocation>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(conversation_id: ConversationId, role: MessageRole, content: String) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role,
            content,
            tool_invocations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(
        id: MessageId,
        conversation_id: ConversationId,
        content: String,
        tool_invocations: Vec<ToolInvocation>,
    ) -> Self {
        Self {
            id,
            conversation_id,
            role: MessageRole::Assistant,
            content,
            tool_invocations,
            created_at: Utc::now(),
        }
    }
}
