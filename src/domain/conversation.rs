use super::{ConversationId, UserId};
use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";

const TITLE_ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: ConversationId,
    pub user_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(user_id: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            user_id,
            title: title.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Derives a title from the opening user message.
    ///
    /// The text is trimmed and cut to `max_chars` characters, with an ellipsis
    /// appended when anything was dropped. Returns `None` for blank input so
    /// the caller can fall back to its default title.
    pub fn derive_title(first_message: &str, max_chars: usize) -> Option<String> {
        let trimmed = first_message.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.chars().count() > max_chars {
            let head: String = trimmed.chars().take(max_chars).collect();
            Some(format!("{}{}", head, TITLE_ELLIPSIS))
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Bumps `updated_at`, never letting it stand still or move backwards.
    pub fn touch(&mut self) {
        self.updated_at = next_updated_at(self.updated_at);
    }
}

/// Returns a timestamp strictly after `previous`, normally "now".
pub fn next_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    let floor = previous + Duration::microseconds(1);
    if now > floor { now } else { floor }
}
