mod chat_event;
mod chat_service;
mod tool_registry;

pub use chat_event::ChatEvent;
pub use chat_service::{
    ChatOptions, ChatRequest, ChatService, ChatServiceError, ChatSession, ExchangeFinalizer,
    GenerationOutcome,
};
pub use tool_registry::ToolRegistry;
