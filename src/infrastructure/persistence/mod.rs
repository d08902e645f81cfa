mod pg_pool;
mod repositories;

pub use repositories::FailingConversationRepository;
pub use repositories::InMemoryConversationRepository;
pub use repositories::MockConversationRepository;
pub use repositories::MockUserRepository;
pub use repositories::PgConversationRepository;
pub use repositories::PgUserRepository;

pub use pg_pool::{create_pool, run_migrations};
