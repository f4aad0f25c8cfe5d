use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a conversation
#[derive(Debug, Clone, FromRow)]
pub struct Chat {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
