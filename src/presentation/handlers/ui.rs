use axum::response::Html;

const CHAT_PAGE: &str = include_str!("../../../static/chat.html");
const USERS_PAGE: &str = include_str!("../../../static/users.html");

pub async fn chat_page_handler() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

/// Read-only listing of stored users, backed by `/api/users`.
pub async fn users_page_handler() -> Html<&'static str> {
    Html(USERS_PAGE)
}
