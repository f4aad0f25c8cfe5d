use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::chats::models::{Chat, ChatImage, ChatMessage};

/// Response DTO for a chat
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponseDto {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<Chat> for ChatResponseDto {
    fn from(c: Chat) -> Self {
        Self {
            id: c.id,
            title: c.title,
            created_at: c.created_at,
        }
    }
}

/// Request DTO for creating a chat
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateChatDto {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be a string between 1 and 255 characters"
    ))]
    pub title: String,
}

/// One image accompanying a user turn
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageInputDto {
    pub base64_image: String,
    pub mime_type: String,
    /// Byte size of the decoded payload; recomputed server-side when absent
    pub size: Option<i64>,
    pub name: String,
}

/// Request DTO for appending one exchange to a chat
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppendMessageDto {
    pub user_message: String,
    pub ai_message: String,
    pub model: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub images: Vec<ImageInputDto>,
}

/// Response DTO for an image
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponseDto {
    pub id: i64,
    pub base64_image: String,
    pub mime_type: String,
    pub size: i64,
    pub name: String,
}

impl From<ChatImage> for ImageResponseDto {
    fn from(i: ChatImage) -> Self {
        Self {
            id: i.id,
            base64_image: i.base64_image,
            mime_type: i.mime_type,
            size: i.size,
            name: i.file_name,
        }
    }
}

/// Response DTO for a message with its images
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponseDto {
    pub id: i64,
    pub user_message: String,
    pub ai_message: String,
    pub model: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub images: Vec<ImageResponseDto>,
}

impl MessageResponseDto {
    pub fn from_parts(message: ChatMessage, images: Vec<ChatImage>) -> Self {
        Self {
            id: message.id,
            user_message: message.user_message,
            ai_message: message.ai_message,
            model: message.model,
            metadata: message.metadata,
            created_at: message.created_at,
            images: images.into_iter().map(Into::into).collect(),
        }
    }
}
