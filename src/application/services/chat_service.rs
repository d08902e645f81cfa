use std::sync::Arc;

use futures::stream::StreamExt;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, instrument, warn};

use crate::application::ports::{ConversationRepository, LlmClient, LlmEvent, RepositoryError};
use crate::domain::{
    Conversation, ConversationId, DEFAULT_CONVERSATION_TITLE, DEFAULT_USER_ID, Message,
    MessageId, MessageRole, ModelMessage, ToolInvocation,
};

use super::{ChatEvent, ToolRegistry};

const EVENT_BUFFER: usize = 64;
const STEP_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub default_title: String,
    pub title_max_chars: usize,
    pub max_steps: usize,
    pub reload_history: bool,
    pub history_limit: usize,
    pub system_prompt: Option<String>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_CONVERSATION_TITLE.to_string(),
            title_max_chars: 50,
            max_steps: 5,
            reload_history: false,
            history_limit: 1000,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub conversation_id: Option<ConversationId>,
    pub messages: Vec<ModelMessage>,
}

/// A running generation.
///
/// `events` closes once the generation has finished and its result has been
/// persisted (or persisting it has failed).
pub struct ChatSession {
    pub conversation_id: Option<ConversationId>,
    pub message_id: MessageId,
    pub events: mpsc::Receiver<ChatEvent>,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatServiceError {
    #[error("no user message provided")]
    NoUserMessage,
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed {
        text: String,
        tool_invocations: Vec<ToolInvocation>,
    },
    Failed {
        error: String,
    },
}

pub struct ChatService<L>
where
    L: LlmClient,
{
    llm_client: Arc<L>,
    conversation_repository: Arc<dyn ConversationRepository>,
    tools: Arc<ToolRegistry>,
    options: ChatOptions,
}

impl<L> ChatService<L>
where
    L: LlmClient + 'static,
{
    pub fn new(
        llm_client: Arc<L>,
        conversation_repository: Arc<dyn ConversationRepository>,
        tools: Arc<ToolRegistry>,
        options: ChatOptions,
    ) -> Self {
        Self {
            llm_client,
            conversation_repository,
            tools,
            options,
        }
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Resolves the conversation, stores the user's turn and starts the model.
    ///
    /// Storage failures are logged and never fail the call; only a request
    /// without user text or naming an unknown conversation is rejected.
    #[instrument(
        skip(self, request),
        fields(conversation_id = ?request.conversation_id, messages = request.messages.len())
    )]
    pub async fn start_chat(&self, request: ChatRequest) -> Result<ChatSession, ChatServiceError> {
        let latest_user_index = request
            .messages
            .iter()
            .rposition(|message| {
                matches!(message, ModelMessage::User { content } if !content.trim().is_empty())
            })
            .ok_or(ChatServiceError::NoUserMessage)?;
        let latest_user_text = request.messages[latest_user_index].content().to_string();

        let resolved = self.resolve_conversation(&request).await?;

        let history = match resolved {
            Some(ResolvedConversation::Existing(id)) if self.options.reload_history => {
                self.load_history(id).await
            }
            _ => Vec::new(),
        };

        let conversation_id = resolved.map(|r| r.id());
        if let Some(id) = conversation_id {
            let user_message = Message::new(id, MessageRole::User, latest_user_text);
            if let Err(e) = self
                .conversation_repository
                .append_message(&user_message)
                .await
            {
                error!(error = %e, conversation_id = %id, "Failed to persist user message");
            }
        }

        let context = self.assemble_context(&history, request.messages, latest_user_index);

        let message_id = MessageId::new();
        let (sender, receiver) = mpsc::channel(EVENT_BUFFER);
        let mut generation = Generation {
            llm_client: Arc::clone(&self.llm_client),
            tools: Arc::clone(&self.tools),
            max_steps: self.options.max_steps.max(1),
            message_id,
            events: EventSink::new(sender),
        };
        let finalizer = conversation_id.map(|id| {
            ExchangeFinalizer::new(Arc::clone(&self.conversation_repository), id, message_id)
        });

        let span = tracing::info_span!(
            "chat_generation",
            conversation_id = %conversation_id.map(|id| id.to_string()).unwrap_or_default(),
            message_id = %message_id
        );

        tokio::spawn(
            async move {
                let outcome = generation.run(context).await;

                if let Some(finalizer) = finalizer {
                    match finalizer.finalize(&outcome).await {
                        Ok(Some(message)) => {
                            info!(message_id = %message.id, "Assistant message persisted")
                        }
                        Ok(None) => warn!("Generation failed, assistant message not persisted"),
                        Err(e) => error!(error = %e, "Failed to persist assistant message"),
                    }
                }

                drop(generation);
            }
            .instrument(span),
        );

        Ok(ChatSession {
            conversation_id,
            message_id,
            events: receiver,
        })
    }

    async fn resolve_conversation(
        &self,
        request: &ChatRequest,
    ) -> Result<Option<ResolvedConversation>, ChatServiceError> {
        if let Some(id) = request.conversation_id {
            return match self.conversation_repository.get_conversation(id).await {
                Ok(Some(_)) => Ok(Some(ResolvedConversation::Existing(id))),
                Ok(None) => Err(ChatServiceError::ConversationNotFound(id)),
                Err(e) => {
                    warn!(error = %e, conversation_id = %id, "Could not verify conversation, continuing");
                    Ok(Some(ResolvedConversation::Existing(id)))
                }
            };
        }

        let first_user_text = request
            .messages
            .iter()
            .find_map(|message| match message {
                ModelMessage::User { content } if !content.trim().is_empty() => {
                    Some(content.as_str())
                }
                _ => None,
            })
            .unwrap_or_default();

        let title = Conversation::derive_title(first_user_text, self.options.title_max_chars)
            .unwrap_or_else(|| self.options.default_title.clone());
        let conversation = Conversation::new(DEFAULT_USER_ID, title);

        match self
            .conversation_repository
            .create_conversation(&conversation)
            .await
        {
            Ok(()) => {
                info!(conversation_id = %conversation.id, title = %conversation.title, "Conversation created");
                Ok(Some(ResolvedConversation::Created(conversation.id)))
            }
            Err(e) => {
                error!(error = %e, "Failed to create conversation, continuing without persistence");
                Ok(None)
            }
        }
    }

    async fn load_history(&self, id: ConversationId) -> Vec<Message> {
        match self
            .conversation_repository
            .get_messages(id, self.options.history_limit)
            .await
        {
            Ok(messages) => {
                debug!(conversation_id = %id, count = messages.len(), "Loaded stored history");
                messages
            }
            Err(e) => {
                warn!(error = %e, conversation_id = %id, "Failed to load stored history");
                Vec::new()
            }
        }
    }

    /// Builds what the model sees: system prompt, stored history, then the
    /// supplied turns. With stored history present, only the supplied turns
    /// from the newest user message onward are kept, the rest being stored.
    fn assemble_context(
        &self,
        history: &[Message],
        supplied: Vec<ModelMessage>,
        latest_user_index: usize,
    ) -> Vec<ModelMessage> {
        let mut context = Vec::with_capacity(history.len() + supplied.len() + 1);

        if let Some(prompt) = self
            .options
            .system_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        {
            context.push(ModelMessage::system(prompt));
        }

        if history.is_empty() {
            context.extend(supplied);
        } else {
            context.extend(history.iter().flat_map(ModelMessage::from_stored));
            context.extend(supplied.into_iter().skip(latest_user_index));
        }

        context
    }
}

#[derive(Debug, Clone, Copy)]
enum ResolvedConversation {
    Existing(ConversationId),
    Created(ConversationId),
}

impl ResolvedConversation {
    fn id(self) -> ConversationId {
        match self {
            ResolvedConversation::Existing(id) | ResolvedConversation::Created(id) => id,
        }
    }
}

/// Persists the assistant's side of one exchange.
///
/// `finalize` takes `self`, so each exchange is written at most once.
pub struct ExchangeFinalizer {
    repository: Arc<dyn ConversationRepository>,
    conversation_id: ConversationId,
    message_id: MessageId,
}

impl ExchangeFinalizer {
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Self {
        Self {
            repository,
            conversation_id,
            message_id,
        }
    }

    /// Returns the stored message, or `None` when the generation failed and
    /// nothing was written.
    pub async fn finalize(
        self,
        outcome: &GenerationOutcome,
    ) -> Result<Option<Message>, RepositoryError> {
        match outcome {
            GenerationOutcome::Completed {
                text,
                tool_invocations,
            } => {
                let message = Message::assistant(
                    self.message_id,
                    self.conversation_id,
                    text.clone(),
                    tool_invocations.clone(),
                );
                self.repository.append_message(&message).await?;
                Ok(Some(message))
            }
            GenerationOutcome::Failed { .. } => Ok(None),
        }
    }
}

/// Forwards events to the client until it goes away, then keeps quiet.
struct EventSink {
    sender: mpsc::Sender<ChatEvent>,
    connected: bool,
}

impl EventSink {
    fn new(sender: mpsc::Sender<ChatEvent>) -> Self {
        Self {
            sender,
            connected: true,
        }
    }

    async fn emit(&mut self, event: ChatEvent) {
        if self.connected && self.sender.send(event).await.is_err() {
            self.connected = false;
            debug!("Client disconnected, generation continues");
        }
    }
}

struct Generation<L>
where
    L: LlmClient,
{
    llm_client: Arc<L>,
    tools: Arc<ToolRegistry>,
    max_steps: usize,
    message_id: MessageId,
    events: EventSink,
}

impl<L> Generation<L>
where
    L: LlmClient,
{
    async fn run(&mut self, mut context: Vec<ModelMessage>) -> GenerationOutcome {
        self.events
            .emit(ChatEvent::Start {
                message_id: self.message_id,
            })
            .await;

        let tool_specs = self.tools.specs();
        let mut step_texts: Vec<String> = Vec::new();
        let mut invocations: Vec<ToolInvocation> = Vec::new();

        for step in 1..=self.max_steps {
            debug!(step, context_len = context.len(), "Starting model step");

            let mut stream = match self.llm_client.stream_chat(&context, &tool_specs).await {
                Ok(stream) => stream,
                Err(e) => return self.fail(e.to_string()).await,
            };

            let mut step_text = String::new();
            let mut calls = Vec::new();

            while let Some(event) = stream.next().await {
                match event {
                    Ok(LlmEvent::TextDelta(delta)) => {
                        step_text.push_str(&delta);
                        self.events.emit(ChatEvent::TextDelta(delta)).await;
                    }
                    Ok(LlmEvent::ToolCall(call)) => calls.push(call),
                    Ok(LlmEvent::Finish(reason)) => {
                        debug!(step, reason = ?reason, "Model step finished")
                    }
                    Err(e) => return self.fail(e.to_string()).await,
                }
            }

            if !step_text.is_empty() {
                step_texts.push(step_text.clone());
            }
            context.push(ModelMessage::Assistant {
                content: step_text,
                tool_calls: calls.clone(),
            });

            if calls.is_empty() {
                break;
            }

            for call in calls {
                self.events
                    .emit(ChatEvent::ToolInputAvailable {
                        tool_call_id: call.id.clone(),
                        tool_name: call.name.clone(),
                        input: call.arguments.clone(),
                    })
                    .await;

                let output = match self.tools.execute(&call).await {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(error = %e, tool = %call.name, "Tool call failed");
                        json!({ "error": e.to_string() })
                    }
                };

                self.events
                    .emit(ChatEvent::ToolOutputAvailable {
                        tool_call_id: call.id.clone(),
                        output: output.clone(),
                    })
                    .await;

                context.push(ModelMessage::Tool {
                    tool_call_id: call.id.clone(),
                    content: output.to_string(),
                });
                invocations.push(ToolInvocation::new(&call, output));
            }

            if step == self.max_steps {
                warn!(max_steps = self.max_steps, "Step budget exhausted");
            }
        }

        self.events.emit(ChatEvent::Finish).await;

        GenerationOutcome::Completed {
            text: step_texts.join(STEP_SEPARATOR),
            tool_invocations: invocations,
        }
    }

    async fn fail(&mut self, error: String) -> GenerationOutcome {
        error!(error = %error, "Model stream failed");
        self.events.emit(ChatEvent::Error(error.clone())).await;
        GenerationOutcome::Failed { error }
    }
}
