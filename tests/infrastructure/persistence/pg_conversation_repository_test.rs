use colloquy::application::ports::{ConversationRepository, RepositoryError};
use colloquy::domain::{
    Conversation, ConversationId, DEFAULT_USER_ID, Message, MessageId, MessageRole, ToolCall,
    ToolInvocation,
};
use serde_json::json;

use crate::helpers::TestPostgres;

async fn create(test_pg: &TestPostgres, title: &str) -> Conversation {
    let conversation = Conversation::new(DEFAULT_USER_ID, title);
    test_pg
        .conversation_repository
        .create_conversation(&conversation)
        .await
        .expect("Failed to create conversation");
    conversation
}

#[tokio::test]
async fn given_new_conversation_when_creating_and_retrieving_then_conversation_is_persisted() {
    let test_pg = TestPostgres::new().await;
    let conversation = create(&test_pg, "Test Conversation").await;

    let retrieved = test_pg
        .conversation_repository
        .get_conversation(conversation.id)
        .await
        .expect("Failed to retrieve conversation")
        .expect("Conversation not found");

    assert_eq!(retrieved.id, conversation.id);
    assert_eq!(retrieved.title, "Test Conversation");
    assert_eq!(retrieved.user_id, DEFAULT_USER_ID);
}

#[tokio::test]
async fn given_conversation_when_appending_messages_then_messages_are_stored_in_order() {
    let test_pg = TestPostgres::new().await;
    let conversation = create(&test_pg, "Chat Session").await;

    let first = Message::new(conversation.id, MessageRole::User, "Hello".to_string());
    test_pg
        .conversation_repository
        .append_message(&first)
        .await
        .expect("Failed to append first message");

    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

    let second = Message::new(
        conversation.id,
        MessageRole::Assistant,
        "Hi there!".to_string(),
    );
    test_pg
        .conversation_repository
        .append_message(&second)
        .await
        .expect("Failed to append second message");

    let messages = test_pg
        .conversation_repository
        .get_messages(conversation.id, 10)
        .await
        .expect("Failed to get messages");

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "Hello");
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[1].content, "Hi there!");
    assert_eq!(messages[1].role, MessageRole::Assistant);
}

#[tokio::test]
async fn given_multiple_messages_when_getting_with_limit_then_returns_most_recent() {
    let test_pg = TestPostgres::new().await;
    let conversation = create(&test_pg, "Limited").await;

    for i in 0..5 {
        test_pg
            .conversation_repository
            .append_message(&Message::new(
                conversation.id,
                MessageRole::User,
                format!("Message {}", i),
            ))
            .await
            .expect("Failed to append message");
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    }

    let messages = test_pg
        .conversation_repository
        .get_messages(conversation.id, 3)
        .await
        .expect("Failed to get messages");

    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].content, "Message 2");
    assert_eq!(messages[2].content, "Message 4");
}

#[tokio::test]
async fn given_assistant_message_with_tools_when_round_tripping_then_invocations_survive() {
    let test_pg = TestPostgres::new().await;
    let conversation = create(&test_pg, "Weather").await;
    let invocation = ToolInvocation::new(
        &ToolCall {
            id: "call_1".to_string(),
            name: "weather".to_string(),
            arguments: json!({ "location": "Oslo" }),
        },
        json!({ "location": "Oslo", "temperature": 50 }),
    );
    let message = Message::assistant(
        MessageId::new(),
        conversation.id,
        "Chilly.".to_string(),
        vec![invocation.clone()],
    );

    test_pg
        .conversation_repository
        .append_message(&message)
        .await
        .expect("Failed to append message");

    let stored = test_pg
        .conversation_repository
        .get_message(message.id)
        .await
        .expect("Failed to get message")
        .expect("Message not found");

    assert_eq!(stored.tool_invocations, vec![invocation]);
    assert_eq!(stored.content, "Chilly.");
}

#[tokio::test]
async fn given_activity_when_listing_then_most_recently_updated_comes_first() {
    let test_pg = TestPostgres::new().await;
    let older = create(&test_pg, "Older").await;
    let newer = create(&test_pg, "Newer").await;

    test_pg
        .conversation_repository
        .append_message(&Message::new(older.id, MessageRole::User, "bump".to_string()))
        .await
        .expect("Failed to append message");

    let listed = test_pg
        .conversation_repository
        .list_conversations(None)
        .await
        .expect("Failed to list conversations");

    assert_eq!(listed[0].id, older.id);
    assert_eq!(listed[1].id, newer.id);
}

#[tokio::test]
async fn given_title_update_when_applied_then_title_changes_and_updated_at_advances() {
    let test_pg = TestPostgres::new().await;
    let conversation = create(&test_pg, "Before").await;

    let updated = test_pg
        .conversation_repository
        .update_title(conversation.id, "After")
        .await
        .expect("Failed to update title")
        .expect("Conversation not found");

    assert_eq!(updated.title, "After");
    assert!(updated.updated_at > conversation.updated_at);
}

#[tokio::test]
async fn given_conversation_with_messages_when_deleting_then_messages_are_cascaded() {
    let test_pg = TestPostgres::new().await;
    let conversation = create(&test_pg, "Doomed").await;
    let message = Message::new(conversation.id, MessageRole::User, "bye".to_string());
    test_pg
        .conversation_repository
        .append_message(&message)
        .await
        .expect("Failed to append message");

    let deleted = test_pg
        .conversation_repository
        .delete_conversation(conversation.id)
        .await
        .expect("Failed to delete conversation");

    assert!(deleted);
    assert!(
        test_pg
            .conversation_repository
            .get_message(message.id)
            .await
            .expect("Failed to get message")
            .is_none()
    );
    assert!(
        !test_pg
            .conversation_repository
            .delete_conversation(conversation.id)
            .await
            .expect("Failed to delete conversation")
    );
}

#[tokio::test]
async fn given_message_for_unknown_conversation_when_appending_then_constraint_is_violated() {
    let test_pg = TestPostgres::new().await;
    let orphan = Message::new(ConversationId::new(), MessageRole::User, "lost".to_string());

    let result = test_pg.conversation_repository.append_message(&orphan).await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
}
