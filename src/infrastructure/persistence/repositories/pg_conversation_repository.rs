use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{ConversationRepository, RepositoryError};
use crate::domain::{
    Conversation, ConversationId, Message, MessageId, MessageRole, ToolInvocation, UserId,
};
use crate::infrastructure::persistence::pg_pool::map_sqlx_error;

pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    user_id: i64,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Conversation {
            id: ConversationId::from_uuid(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: Uuid,
    role: String,
    content: String,
    tool_invocations: Option<Json<Vec<ToolInvocation>>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<MessageRole>()
            .map_err(RepositoryError::QueryFailed)?;

        Ok(Message {
            id: MessageId::from_uuid(row.id),
            conversation_id: ConversationId::from_uuid(row.conversation_id),
            role,
            content: row.content,
            tool_invocations: row
                .tool_invocations
                .map(|Json(invocations)| invocations)
                .unwrap_or_default(),
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id))]
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO conversations (id, user_id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(conversation.id.as_uuid())
        .bind(conversation.user_id.as_i64())
        .bind(&conversation.title)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, user_id, title, created_at, updated_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Conversation::from))
    }

    #[instrument(skip(self), fields(user_id = ?user_id.map(|u| u.as_i64())))]
    async fn list_conversations(
        &self,
        user_id: Option<UserId>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, user_id, title, created_at, updated_at
            FROM conversations
            WHERE $1::BIGINT IS NULL OR user_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id.map(|u| u.as_i64()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Conversation::from).collect())
    }

    #[instrument(skip(self, title), fields(conversation_id = %id))]
    async fn update_title(
        &self,
        id: ConversationId,
        title: &str,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            UPDATE conversations
            SET title = $2,
                updated_at = GREATEST($3, updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING id, user_id, title, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(title)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Conversation::from))
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn delete_conversation(&self, id: ConversationId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, conversation_id = %message.conversation_id, role = %message.role))]
    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let tool_invocations =
            (!message.tool_invocations.is_empty()).then(|| Json(&message.tool_invocations));

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, tool_invocations, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.conversation_id.as_uuid())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(tool_invocations)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            UPDATE conversations
            SET updated_at = GREATEST($2, updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            "#,
        )
        .bind(message.conversation_id.as_uuid())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(message_id = %id))]
    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, conversation_id, role, content, tool_invocations, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Message::try_from).transpose()
    }

    #[instrument(skip(self), fields(conversation_id = %conversation_id, limit = %limit))]
    async fn get_messages(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, conversation_id, role, content, tool_invocations, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(conversation_id.as_uuid())
        .bind(limit_i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut messages = rows
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        messages.reverse();
        Ok(messages)
    }
}
