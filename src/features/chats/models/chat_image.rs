use sqlx::FromRow;

/// Database model for an image attached to a chat message
#[derive(Debug, Clone, FromRow)]
pub struct ChatImage {
    pub id: i64,
    pub message_id: i64,
    pub base64_image: String,
    pub mime_type: String,
    pub size: i64,
    pub file_name: String,
}
