use std::sync::Arc;

use crate::application::ports::{ConversationRepository, LlmClient, UserRepository};
use crate::application::services::ChatService;
use crate::presentation::config::Settings;

/// Everything a handler needs, built once at startup and shared by the router.
pub struct AppState<L>
where
    L: LlmClient,
{
    pub chat_service: Arc<ChatService<L>>,
    pub conversation_repository: Arc<dyn ConversationRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub settings: Settings,
}

impl<L> Clone for AppState<L>
where
    L: LlmClient,
{
    fn clone(&self) -> Self {
        Self {
            chat_service: Arc::clone(&self.chat_service),
            conversation_repository: Arc::clone(&self.conversation_repository),
            user_repository: Arc::clone(&self.user_repository),
            settings: self.settings.clone(),
        }
    }
}
