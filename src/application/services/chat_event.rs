use serde_json::Value;

use crate::domain::MessageId;

/// What a chat generation reports to the caller while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Start {
        message_id: MessageId,
    },
    TextDelta(String),
    ToolInputAvailable {
        tool_call_id: String,
        tool_name: String,
        input: Value,
    },
    ToolOutputAvailable {
        tool_call_id: String,
        output: Value,
    },
    Error(String),
    Finish,
}
