use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use crate::application::ports::{Tool, ToolError, ToolSpec};
use crate::domain::ToolCall;

/// The tools offered to the model, looked up by name when it calls one.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Later registrations replace earlier ones with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|existing| existing.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    #[instrument(skip(self, call), fields(tool = %call.name, tool_call_id = %call.id))]
    pub async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;

        tool.execute(call.arguments.clone()).await
    }
}
