use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{ConversationRepository, RepositoryError};
use crate::domain::{Conversation, ConversationId, Message, MessageId, UserId, next_updated_at};

#[derive(Default)]
struct Store {
    conversations: HashMap<ConversationId, Conversation>,
    messages: Vec<Message>,
}

/// Process-local repository with the same observable rules as the
/// PostgreSQL one: cascading deletes, foreign-key checks, and strictly
/// increasing `updated_at`.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    store: RwLock<Store>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn conversation_count(&self) -> usize {
        self.store.read().await.conversations.len()
    }

    pub async fn message_count(&self) -> usize {
        self.store.read().await.messages.len()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        if store.conversations.contains_key(&conversation.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "conversation {} already exists",
                conversation.id
            )));
        }
        store
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self.store.read().await.conversations.get(&id).cloned())
    }

    async fn list_conversations(
        &self,
        user_id: Option<UserId>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let store = self.store.read().await;
        let mut conversations: Vec<Conversation> = store
            .conversations
            .values()
            .filter(|c| user_id.is_none_or(|user_id| c.user_id == user_id))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn update_title(
        &self,
        id: ConversationId,
        title: &str,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let mut store = self.store.write().await;
        Ok(store.conversations.get_mut(&id).map(|conversation| {
            conversation.title = title.to_string();
            conversation.touch();
            conversation.clone()
        }))
    }

    async fn delete_conversation(&self, id: ConversationId) -> Result<bool, RepositoryError> {
        let mut store = self.store.write().await;
        if store.conversations.remove(&id).is_none() {
            return Ok(false);
        }
        store.messages.retain(|m| m.conversation_id != id);
        Ok(true)
    }

    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        if store.messages.iter().any(|m| m.id == message.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "message {} already exists",
                message.id
            )));
        }
        let conversation = store
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or_else(|| {
                RepositoryError::ConstraintViolation(format!(
                    "conversation {} does not exist",
                    message.conversation_id
                ))
            })?;
        conversation.updated_at = next_updated_at(conversation.updated_at);
        store.messages.push(message.clone());
        Ok(())
    }

    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn get_messages(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError> {
        let store = self.store.read().await;
        let mut messages: Vec<Message> = store
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.split_off(skip))
    }
}
