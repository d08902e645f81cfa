pub mod api_types;
mod chat;
mod conversations;
mod error;
mod health;
mod ui;
mod users;

pub use chat::{CONVERSATION_ID_HEADER, chat_handler};
pub use conversations::{
    create_conversation_handler, delete_conversation_handler, get_conversation_handler,
    list_conversations_handler, list_messages_handler, update_conversation_handler,
};
pub use error::{ApiError, ErrorResponse};
pub use health::health_handler;
pub use ui::{chat_page_handler, users_page_handler};
pub use users::list_users_handler;
