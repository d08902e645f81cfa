use crate::application::ports::{ConversationRepository, RepositoryError, UserRepository};
use crate::domain::{Conversation, ConversationId, DEFAULT_USER_ID, Message, MessageId, User, UserId};

pub struct MockConversationRepository;

#[async_trait::async_trait]
impl ConversationRepository for MockConversationRepository {
    async fn create_conversation(
        &self,
        _conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn get_conversation(
        &self,
        _id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(None)
    }

    async fn list_conversations(
        &self,
        _user_id: Option<UserId>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        Ok(vec![])
    }

    async fn update_title(
        &self,
        _id: ConversationId,
        _title: &str,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(None)
    }

    async fn delete_conversation(&self, _id: ConversationId) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    async fn append_message(&self, _message: &Message) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn get_message(&self, _id: MessageId) -> Result<Option<Message>, RepositoryError> {
        Ok(None)
    }

    async fn get_messages(
        &self,
        _conversation_id: ConversationId,
        _limit: usize,
    ) -> Result<Vec<Message>, RepositoryError> {
        Ok(vec![])
    }
}

/// Every call fails as if the database were unreachable.
pub struct FailingConversationRepository;

fn unavailable<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::ConnectionFailed(
        "database unavailable".to_string(),
    ))
}

#[async_trait::async_trait]
impl ConversationRepository for FailingConversationRepository {
    async fn create_conversation(
        &self,
        _conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        unavailable()
    }

    async fn get_conversation(
        &self,
        _id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        unavailable()
    }

    async fn list_conversations(
        &self,
        _user_id: Option<UserId>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        unavailable()
    }

    async fn update_title(
        &self,
        _id: ConversationId,
        _title: &str,
    ) -> Result<Option<Conversation>, RepositoryError> {
        unavailable()
    }

    async fn delete_conversation(&self, _id: ConversationId) -> Result<bool, RepositoryError> {
        unavailable()
    }

    async fn append_message(&self, _message: &Message) -> Result<(), RepositoryError> {
        unavailable()
    }

    async fn get_message(&self, _id: MessageId) -> Result<Option<Message>, RepositoryError> {
        unavailable()
    }

    async fn get_messages(
        &self,
        _conversation_id: ConversationId,
        _limit: usize,
    ) -> Result<Vec<Message>, RepositoryError> {
        unavailable()
    }
}

pub struct MockUserRepository;

#[async_trait::async_trait]
impl UserRepository for MockUserRepository {
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(vec![User {
            id: DEFAULT_USER_ID,
            name: "Default User".to_string(),
            age: 0,
            email: "default@localhost".to_string(),
        }])
    }
}
