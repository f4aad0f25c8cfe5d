use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for one question/answer turn within a chat
#[derive(Debug, Clone, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub chat_id: i64,
    pub user_message: String,
    pub ai_message: String,
    pub model: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
