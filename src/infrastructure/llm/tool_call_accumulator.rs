use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::ToolCall;

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Reassembles tool calls streamed as fragments keyed by their index.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    partials: BTreeMap<usize, PartialToolCall>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        index: usize,
        id: Option<&str>,
        name: Option<&str>,
        arguments: Option<&str>,
    ) {
        let partial = self.partials.entry(index).or_default();
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            partial.id = id.to_string();
        }
        if let Some(name) = name {
            partial.name.push_str(name);
        }
        if let Some(arguments) = arguments {
            partial.arguments.push_str(arguments);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }

    /// Completed calls in index order.
    ///
    /// Arguments that are not valid JSON are passed through as a string so the
    /// tool can reject them and the model sees why.
    pub fn drain(&mut self) -> Vec<ToolCall> {
        std::mem::take(&mut self.partials)
            .into_iter()
            .map(|(index, partial)| {
                let arguments = if partial.arguments.trim().is_empty() {
                    Value::Object(Default::default())
                } else {
                    serde_json::from_str(&partial.arguments)
                        .unwrap_or(Value::String(partial.arguments))
                };
                let id = if partial.id.is_empty() {
                    format!("call_{}", index)
                } else {
                    partial.id
                };
                ToolCall {
                    id,
                    name: partial.name,
                    arguments,
                }
            })
            .collect()
    }
}
