use std::collections::VecDeque;
use std::sync::Mutex;

use crate::application::ports::{
    FinishReason, LlmClient, LlmClientError, LlmEvent, LlmEventStream, ToolSpec,
};
use crate::domain::ModelMessage;

const MOCK_ANSWER: &str = "Mock answer";

pub struct MockLlmClient;

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    async fn stream_chat(
        &self,
        _messages: &[ModelMessage],
        _tools: &[ToolSpec],
    ) -> Result<LlmEventStream, LlmClientError> {
        Ok(Box::pin(futures::stream::iter(answer_events(MOCK_ANSWER))))
    }
}

/// Plays back one scripted step per call and records what it was sent.
///
/// Once the script runs out every further step answers "Mock answer".
pub struct ScriptedLlmClient {
    steps: Mutex<VecDeque<Vec<Result<LlmEvent, String>>>>,
    requests: Mutex<Vec<Vec<ModelMessage>>>,
}

impl ScriptedLlmClient {
    pub fn new(steps: Vec<Vec<LlmEvent>>) -> Self {
        Self::from_results(
            steps
                .into_iter()
                .map(|events| events.into_iter().map(Ok).collect())
                .collect(),
        )
    }

    /// A single step that streams `partial` and then breaks with `error`.
    pub fn failing(partial: Vec<LlmEvent>, error: &str) -> Self {
        let mut step: Vec<Result<LlmEvent, String>> = partial.into_iter().map(Ok).collect();
        step.push(Err(error.to_string()));
        Self::from_results(vec![step])
    }

    fn from_results(steps: Vec<Vec<Result<LlmEvent, String>>>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The context passed to each call so far.
    pub fn requests(&self) -> Vec<Vec<ModelMessage>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn stream_chat(
        &self,
        messages: &[ModelMessage],
        _tools: &[ToolSpec],
    ) -> Result<LlmEventStream, LlmClientError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(messages.to_vec());

        let step = self
            .steps
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();

        let events: Vec<Result<LlmEvent, LlmClientError>> = match step {
            Some(step) => step
                .into_iter()
                .map(|event| event.map_err(LlmClientError::ApiRequestFailed))
                .collect(),
            None => answer_events(MOCK_ANSWER),
        };

        Ok(Box::pin(futures::stream::iter(events)))
    }
}

fn answer_events(answer: &str) -> Vec<Result<LlmEvent, LlmClientError>> {
    let mut events: Vec<Result<LlmEvent, LlmClientError>> = answer
        .split_inclusive(' ')
        .map(|token| Ok(LlmEvent::TextDelta(token.to_string())))
        .collect();
    events.push(Ok(LlmEvent::Finish(FinishReason::Stop)));
    events
}
