mod in_memory_repository;
mod mock_repository;
mod pg_conversation_repository;
mod pg_user_repository;

pub use in_memory_repository::InMemoryConversationRepository;
pub use mock_repository::{
    FailingConversationRepository, MockConversationRepository, MockUserRepository,
};
pub use pg_conversation_repository::PgConversationRepository;
pub use pg_user_repository::PgUserRepository;
