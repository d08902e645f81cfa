use axum::Router;
use axum::http::HeaderName;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::LlmClient;
use crate::infrastructure::observability::{REQUEST_ID_HEADER, request_id_middleware};
use crate::presentation::handlers::{
    CONVERSATION_ID_HEADER, chat_handler, chat_page_handler, create_conversation_handler,
    delete_conversation_handler, get_conversation_handler, health_handler,
    list_conversations_handler, list_messages_handler, list_users_handler,
    update_conversation_handler, users_page_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<L>(state: AppState<L>) -> Router
where
    L: LlmClient + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(CONVERSATION_ID_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/", get(chat_page_handler))
        .route("/chat", get(chat_page_handler))
        .route("/db", get(users_page_handler))
        .route("/health", get(health_handler::<L>))
        .route("/api/chat", post(chat_handler::<L>))
        .route(
            "/api/conversations",
            get(list_conversations_handler::<L>).post(create_conversation_handler::<L>),
        )
        .route(
            "/api/conversations/{id}",
            get(get_conversation_handler::<L>)
                .put(update_conversation_handler::<L>)
                .delete(delete_conversation_handler::<L>),
        )
        .route(
            "/api/conversations/{id}/messages",
            get(list_messages_handler::<L>),
        )
        .route("/api/users", get(list_users_handler::<L>))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
