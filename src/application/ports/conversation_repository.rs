use crate::domain::{Conversation, ConversationId, Message, MessageId, UserId};
use async_trait::async_trait;

use super::RepositoryError;

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create_conversation(&self, conversation: &Conversation)
    -> Result<(), RepositoryError>;

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// Most recently updated first, optionally restricted to one owner.
    async fn list_conversations(
        &self,
        user_id: Option<UserId>,
    ) -> Result<Vec<Conversation>, RepositoryError>;

    /// Renames a conversation and refreshes its `updated_at`.
    async fn update_title(
        &self,
        id: ConversationId,
        title: &str,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// Returns `false` when nothing was deleted. Messages go with it.
    async fn delete_conversation(&self, id: ConversationId) -> Result<bool, RepositoryError>;

    /// Stores the message and refreshes the owning conversation's `updated_at`.
    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError>;

    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, RepositoryError>;

    /// The newest `limit` messages, returned oldest first.
    async fn get_messages(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError>;
}
