use crate::domain::User;
use async_trait::async_trait;

use super::RepositoryError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;
}
