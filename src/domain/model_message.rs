use super::{Message, MessageRole, ToolCall};

/// A turn as the model sees it, one variant per role.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl ModelMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ModelMessage::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ModelMessage::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ModelMessage::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn role(&self) -> MessageRole {
        match self {
            ModelMessage::System { .. } => MessageRole::System,
            ModelMessage::User { .. } => MessageRole::User,
            ModelMessage::Assistant { .. } => MessageRole::Assistant,
            ModelMessage::Tool { .. } => MessageRole::Tool,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ModelMessage::System { content }
            | ModelMessage::User { content }
            | ModelMessage::Assistant { content, .. }
            | ModelMessage::Tool { content, .. } => content,
        }
    }

    /// Expands a stored message into the turns the model expects.
    ///
    /// An assistant message that used tools becomes the tool-call turn, one
    /// tool-result turn per invocation, then the final text.
    pub fn from_stored(message: &Message) -> Vec<ModelMessage> {
        match message.role {
            MessageRole::System => vec![ModelMessage::system(message.content.clone())],
            MessageRole::User => vec![ModelMessage::user(message.content.clone())],
            MessageRole::Assistant if message.tool_invocations.is_empty() => {
                vec![ModelMessage::assistant(message.content.clone())]
            }
            MessageRole::Assistant => {
                let mut turns = Vec::with_capacity(message.tool_invocations.len() + 2);
                turns.push(ModelMessage::Assistant {
                    content: String::new(),
                    tool_calls: message
                        .tool_invocations
                        .iter()
                        .map(|invocation| invocation.to_call())
                        .collect(),
                });
                turns.extend(message.tool_invocations.iter().map(|invocation| {
                    ModelMessage::Tool {
                        tool_call_id: invocation.tool_call_id.clone(),
                        content: invocation.output.to_string(),
                    }
                }));
                if !message.content.is_empty() {
                    turns.push(ModelMessage::assistant(message.content.clone()));
                }
                turns
            }
            MessageRole::Tool => match message.tool_invocations.first() {
                Some(invocation) => vec![ModelMessage::Tool {
                    tool_call_id: invocation.tool_call_id.clone(),
                    content: message.content.clone(),
                }],
                None => vec![ModelMessage::Tool {
                    tool_call_id: message.id.to_string(),
                    content: message.content.clone(),
                }],
            },
        }
    }
}
