mod conversation_repository;
mod llm_client;
mod repository_error;
mod tool;
mod user_repository;

pub use conversation_repository::ConversationRepository;
pub use llm_client::{FinishReason, LlmClient, LlmClientError, LlmEvent, LlmEventStream, ToolSpec};
pub use repository_error::RepositoryError;
pub use tool::{Tool, ToolError};
pub use user_repository::UserRepository;
