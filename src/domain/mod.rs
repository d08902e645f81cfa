mod conversation;
mod conversation_id;
mod message;
mod message_id;
mod message_role;
mod model_message;
mod tool_call;
mod user;

pub use conversation::{Conversation, DEFAULT_CONVERSATION_TITLE, next_updated_at};
pub use conversation_id::ConversationId;
pub use message::Message;
pub use message_id::MessageId;
pub use message_role::MessageRole;
pub use model_message::ModelMessage;
pub use tool_call::{ToolCall, ToolInvocation};
pub use user::{DEFAULT_USER_ID, User, UserId};
