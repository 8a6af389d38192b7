// service/chat.rs
use std::sync::Arc;

use crate::{
    config::Config,
    dtos::chatdtos::{ChatMessage, ChatRole},
    service::{
        error::ServiceError,
        gemini::{Content, GenerativeModel, Part},
    },
};

pub const SYSTEM_PROMPT: &str = "You are an eco-friendly waste management assistant. Help users with:
- Where to dispose of specific items
- How to properly recycle or dispose of waste
- Environmental impact of different disposal methods
- Tips for reducing waste
- Local recycling guidelines
- Hazardous waste handling

Be friendly, concise, and actionable. Always prioritize environmental safety.";

pub const ACKNOWLEDGEMENT: &str = "I understand. I'm ready to help with waste management questions!";

/// System prompt, the canned acknowledgement, prior turns, then the new message.
pub fn build_conversation(message: &str, history: &[ChatMessage]) -> Vec<Content> {
    let mut contents = Vec::with_capacity(history.len() + 3);
    contents.push(Content::user(vec![Part::text(SYSTEM_PROMPT)]));
    contents.push(Content::model(ACKNOWLEDGEMENT));

    for turn in history {
        contents.push(match turn.role {
            ChatRole::User => Content::user(vec![Part::text(turn.content.clone())]),
            ChatRole::Assistant => Content::model(turn.content.clone()),
        });
    }

    contents.push(Content::user(vec![Part::text(message)]));
    contents
}

#[derive(Debug, Clone)]
pub struct ChatService {
    model: Arc<dyn GenerativeModel>,
    env: Config,
}

impl ChatService {
    pub fn new(model: Arc<dyn GenerativeModel>, env: Config) -> Self {
        Self { model, env }
    }

    /// The assistant runs on the server key only.
    pub fn is_configured(&self) -> bool {
        self.env.gemini_api_key.is_some()
    }

    pub async fn reply(&self, message: &str, history: &[ChatMessage]) -> Result<String, ServiceError> {
        let key = self.env.gemini_api_key.as_deref().ok_or(ServiceError::MissingApiKey)?;
        tracing::debug!(turns = history.len(), "sending chat message");
        self.model
            .generate_content(key, build_conversation(message, history))
            .await
    }
}
