use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::application::ports::LlmClient;
use crate::presentation::state::AppState;

use super::api_types::{UserResponse, UsersResponse};
use super::error::ApiError;

#[tracing::instrument(skip(state))]
pub async fn list_users_handler<L>(
    State(state): State<AppState<L>>,
) -> Result<impl IntoResponse, ApiError>
where
    L: LlmClient + 'static,
{
    let users = state
        .user_repository
        .list_users()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch users", &e))?;

    Ok(Json(UsersResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}
