use colloquy::application::ports::UserRepository;
use colloquy::domain::DEFAULT_USER_ID;

use crate::helpers::TestPostgres;

#[tokio::test]
async fn given_fresh_database_when_listing_users_then_returns_seeded_default_user() {
    let test_pg = TestPostgres::new().await;

    let users = test_pg
        .user_repository
        .list_users()
        .await
        .expect("Failed to list users");

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, DEFAULT_USER_ID);
}
