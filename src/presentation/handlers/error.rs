use axum::Json;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::application::ports::RepositoryError;
use crate::domain::ConversationId;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A failed request: status plus the message returned as `{ "error": ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conversation_not_found(id: ConversationId) -> Self {
        Self::not_found(format!("Conversation not found: {}", id))
    }

    /// Logs `error` and hides it behind `message`.
    pub fn internal(message: impl Into<String>, error: &RepositoryError) -> Self {
        let message = message.into();
        tracing::error!(error = %error, "{}", message);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub fn parse_conversation_id(raw: &str) -> Result<ConversationId, ApiError> {
    raw.parse::<ConversationId>()
        .map_err(|_| ApiError::bad_request(format!("Invalid conversation ID: {}", raw)))
}

/// Decodes a JSON request body, reporting malformed or mistyped input as 400.
pub fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
}
