use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A model's request to run a named tool with JSON arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// A tool call together with the result it produced.
///
/// Stored on assistant messages as a JSON array, so the serialized shape is
/// part of the persisted schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub tool_call_id: String,
    pub tool_name: String,
    pub input: Value,
    pub output: Value,
}

impl ToolInvocation {
    pub fn new(call: &ToolCall, output: Value) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            input: call.arguments.clone(),
            output,
        }
    }

    pub fn to_call(&self) -> ToolCall {
        ToolCall {
            id: self.tool_call_id.clone(),
            name: self.tool_name.clone(),
            arguments: self.input.clone(),
        }
    }
}
