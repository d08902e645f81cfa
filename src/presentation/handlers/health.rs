use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::application::ports::LlmClient;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tools: Vec<String>,
}

/// Liveness only; the database is not probed.
pub async fn health_handler<L>(State(state): State<AppState<L>>) -> Json<HealthResponse>
where
    L: LlmClient + 'static,
{
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        tools: state
            .chat_service
            .tools()
            .specs()
            .into_iter()
            .map(|spec| spec.name)
            .collect(),
    })
}
