use std::collections::HashMap;

use base64::prelude::*;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::core::error::{AppError, Result};
use crate::features::chats::dtos::{
    AppendMessageDto, ChatResponseDto, CreateChatDto, MessageResponseDto,
};
use crate::features::chats::models::{Chat, ChatImage, ChatMessage};

/// One flat row of the eager-join read: the chat with its messages and each
/// message's images. Messages and images are NULL where the left joins found
/// nothing.
#[derive(Debug, Clone, FromRow)]
pub struct ChatGraphRow {
    pub chat_id: i64,
    pub message_id: Option<i64>,
    pub image_id: Option<i64>,
}

/// Delete sequence derived from the loaded graph, cheapest first to verify:
/// one bulk image delete per message owning at least one image, one bulk
/// message delete, one chat delete.
#[derive(Debug, PartialEq, Eq)]
pub struct DeletePlan {
    pub chat_id: i64,
    /// Message ids that own at least one image, in message order
    pub message_ids_with_images: Vec<i64>,
}

impl DeletePlan {
    /// Derive the plan from join rows. Returns `None` when no row matched
    /// the chat identifier.
    pub fn from_rows(rows: &[ChatGraphRow]) -> Option<Self> {
        let chat_id = rows.first()?.chat_id;

        let mut message_ids_with_images = Vec::new();
        for row in rows {
            if let (Some(message_id), Some(_)) = (row.message_id, row.image_id) {
                if !message_ids_with_images.contains(&message_id) {
                    message_ids_with_images.push(message_id);
                }
            }
        }

        Some(Self {
            chat_id,
            message_ids_with_images,
        })
    }

    /// Total delete statements the plan issues: one per message with images,
    /// one for all messages, one for the chat.
    pub fn operation_count(&self) -> usize {
        self.message_ids_with_images.len() + 2
    }
}

/// Service for conversation history operations
pub struct ChatService {
    pool: PgPool,
}

impl ChatService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List chats, newest first
    pub async fn list(&self) -> Result<Vec<ChatResponseDto>> {
        let chats = sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, title, created_at, updated_at
            FROM chats
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list chats: {:?}", e);
            AppError::from(e)
        })?;

        Ok(chats.into_iter().map(Into::into).collect())
    }

    /// Create a chat; called on the first successful exchange of a new chat
    pub async fn create(&self, dto: CreateChatDto) -> Result<ChatResponseDto> {
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            INSERT INTO chats (title)
            VALUES ($1)
            RETURNING id, title, created_at, updated_at
            "#,
        )
        .bind(dto.title.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create chat: {:?}", e);
            AppError::from(e)
        })?;

        Ok(chat.into())
    }

    /// Delete a chat with all of its messages and images in one transaction.
    ///
    /// The graph is read with one eager-join query, the delete sequence is
    /// derived as a [`DeletePlan`], and every statement runs inside the same
    /// transaction so a failure at any step rolls back the whole cascade.
    pub async fn delete_cascade(&self, chat_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin delete transaction: {:?}", e);
            AppError::from(e)
        })?;

        let rows = sqlx::query_as::<_, ChatGraphRow>(
            r#"
            SELECT c.id AS chat_id, m.id AS message_id, i.id AS image_id
            FROM chats c
            LEFT JOIN chat_messages m ON m.chat_id = c.id
            LEFT JOIN chat_images i ON i.message_id = m.id
            WHERE c.id = $1
            ORDER BY m.id, i.id
            "#,
        )
        .bind(chat_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load chat {} for deletion: {:?}", chat_id, e);
            AppError::from(e)
        })?;

        let plan = DeletePlan::from_rows(&rows)
            .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;

        self.execute_plan(&mut tx, &plan).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit delete of chat {}: {:?}", chat_id, e);
            AppError::from(e)
        })?;

        tracing::info!(
            "Deleted chat {} ({} delete operations)",
            chat_id,
            plan.operation_count()
        );
        Ok(())
    }

    async fn execute_plan(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        plan: &DeletePlan,
    ) -> Result<()> {
        for message_id in &plan.message_ids_with_images {
            sqlx::query("DELETE FROM chat_images WHERE message_id = $1")
                .bind(message_id)
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to delete images of message {}: {:?}",
                        message_id,
                        e
                    );
                    AppError::from(e)
                })?;
        }

        // Bulk message delete is issued even for an empty chat
        sqlx::query("DELETE FROM chat_messages WHERE chat_id = $1")
            .bind(plan.chat_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to delete messages of chat {}: {:?}",
                    plan.chat_id,
                    e
                );
                AppError::from(e)
            })?;

        sqlx::query("DELETE FROM chats WHERE id = $1")
            .bind(plan.chat_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete chat {}: {:?}", plan.chat_id, e);
                AppError::from(e)
            })?;

        Ok(())
    }

    /// Update a chat's title; the single field mutation and its timestamp
    pub async fn update_title(&self, chat_id: i64, title: &str) -> Result<()> {
        let existing = sqlx::query_as::<_, Chat>(
            "SELECT id, title, created_at, updated_at FROM chats WHERE id = $1",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up chat {}: {:?}", chat_id, e);
            AppError::from(e)
        })?;

        if existing.is_none() {
            return Err(AppError::NotFound("Chat not found".to_string()));
        }

        sqlx::query("UPDATE chats SET title = $1, updated_at = NOW() WHERE id = $2")
            .bind(title)
            .bind(chat_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update title of chat {}: {:?}", chat_id, e);
                AppError::from(e)
            })?;

        Ok(())
    }

    /// Messages of a chat in insertion order, each with its images
    pub async fn list_messages(&self, chat_id: i64) -> Result<Vec<MessageResponseDto>> {
        self.require_chat(chat_id).await?;

        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, chat_id, user_message, ai_message, model, metadata, created_at
            FROM chat_messages
            WHERE chat_id = $1
            ORDER BY id
            "#,
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list messages of chat {}: {:?}", chat_id, e);
            AppError::from(e)
        })?;

        let message_ids: Vec<i64> = messages.iter().map(|m| m.id).collect();
        let images = if message_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as::<_, ChatImage>(
                r#"
                SELECT id, message_id, base64_image, mime_type, size, file_name
                FROM chat_images
                WHERE message_id = ANY($1)
                ORDER BY id
                "#,
            )
            .bind(&message_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list images of chat {}: {:?}", chat_id, e);
                AppError::from(e)
            })?
        };

        // Reassemble flat rows into owned collections
        let mut images_by_message: HashMap<i64, Vec<ChatImage>> = HashMap::new();
        for image in images {
            images_by_message
                .entry(image.message_id)
                .or_default()
                .push(image);
        }

        Ok(messages
            .into_iter()
            .map(|message| {
                let own = images_by_message.remove(&message.id).unwrap_or_default();
                MessageResponseDto::from_parts(message, own)
            })
            .collect())
    }

    /// Append one exchange (and its images) to a chat in one transaction
    pub async fn append_message(
        &self,
        chat_id: i64,
        dto: AppendMessageDto,
    ) -> Result<MessageResponseDto> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin append transaction: {:?}", e);
            AppError::from(e)
        })?;

        let chat = sqlx::query_as::<_, Chat>(
            "SELECT id, title, created_at, updated_at FROM chats WHERE id = $1",
        )
        .bind(chat_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up chat {}: {:?}", chat_id, e);
            AppError::from(e)
        })?;

        if chat.is_none() {
            return Err(AppError::NotFound("Chat not found".to_string()));
        }

        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (chat_id, user_message, ai_message, model, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, chat_id, user_message, ai_message, model, metadata, created_at
            "#,
        )
        .bind(chat_id)
        .bind(&dto.user_message)
        .bind(&dto.ai_message)
        .bind(&dto.model)
        .bind(&dto.metadata)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert message into chat {}: {:?}", chat_id, e);
            AppError::from(e)
        })?;

        let mut images = Vec::with_capacity(dto.images.len());
        for input in dto.images {
            let size = match input.size {
                Some(size) => size,
                None => decoded_size(&input.base64_image)?,
            };

            let image = sqlx::query_as::<_, ChatImage>(
                r#"
                INSERT INTO chat_images (message_id, base64_image, mime_type, size, file_name)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, message_id, base64_image, mime_type, size, file_name
                "#,
            )
            .bind(message.id)
            .bind(&input.base64_image)
            .bind(&input.mime_type)
            .bind(size)
            .bind(&input.name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to insert image for message {}: {:?}",
                    message.id,
                    e
                );
                AppError::from(e)
            })?;
            images.push(image);
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit append to chat {}: {:?}", chat_id, e);
            AppError::from(e)
        })?;

        Ok(MessageResponseDto::from_parts(message, images))
    }

    async fn require_chat(&self, chat_id: i64) -> Result<()> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM chats WHERE id = $1")
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up chat {}: {:?}", chat_id, e);
                AppError::from(e)
            })?;

        found
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))
    }
}

/// Byte size of a base64 payload after decoding
fn decoded_size(base64_image: &str) -> Result<i64> {
    BASE64_STANDARD
        .decode(base64_image)
        .map(|bytes| bytes.len() as i64)
        .map_err(|_| AppError::BadRequest("Invalid base64 image payload".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(chat_id: i64, message_id: Option<i64>, image_id: Option<i64>) -> ChatGraphRow {
        ChatGraphRow {
            chat_id,
            message_id,
            image_id,
        }
    }

    #[test]
    fn plan_is_none_for_missing_chat() {
        assert_eq!(DeletePlan::from_rows(&[]), None);
    }

    #[test]
    fn empty_chat_plans_two_operations() {
        // A chat with zero messages joins to a single all-NULL row
        let rows = vec![row(1, None, None)];
        let plan = DeletePlan::from_rows(&rows).unwrap();

        assert_eq!(plan.chat_id, 1);
        assert!(plan.message_ids_with_images.is_empty());
        assert_eq!(plan.operation_count(), 2);
    }

    #[test]
    fn messages_without_images_add_no_operations() {
        let rows = vec![row(1, Some(10), None), row(1, Some(11), None)];
        let plan = DeletePlan::from_rows(&rows).unwrap();

        assert!(plan.message_ids_with_images.is_empty());
        assert_eq!(plan.operation_count(), 2);
    }

    #[test]
    fn two_messages_one_with_images_plans_three_operations() {
        let rows = vec![
            row(1, Some(10), Some(100)),
            row(1, Some(11), None),
        ];
        let plan = DeletePlan::from_rows(&rows).unwrap();

        assert_eq!(plan.message_ids_with_images, vec![10]);
        assert_eq!(plan.operation_count(), 3);
    }

    #[test]
    fn message_without_images_triggers_no_image_delete() {
        // Chat 1: message 1 has two images, message 2 has none.
        // M = 1, so 3 operations; the empty message never gets a no-op call.
        let rows = vec![
            row(1, Some(1), Some(100)),
            row(1, Some(1), Some(101)),
            row(1, Some(2), None),
        ];
        let plan = DeletePlan::from_rows(&rows).unwrap();

        assert_eq!(plan.message_ids_with_images, vec![1]);
        assert_eq!(plan.operation_count(), 3);
    }

    #[test]
    fn delete_scenario_two_messages_each_with_images() {
        // Chat 1: message 1 has two images, message 2 has one -> 4 operations
        let rows = vec![
            row(1, Some(1), Some(100)),
            row(1, Some(1), Some(101)),
            row(1, Some(2), Some(102)),
        ];
        let plan = DeletePlan::from_rows(&rows).unwrap();

        assert_eq!(plan.message_ids_with_images, vec![1, 2]);
        assert_eq!(plan.operation_count(), 4);
    }

    #[test]
    fn one_image_delete_per_message_not_per_image() {
        // Three messages, each with several images: exactly M + 2 operations
        let rows = vec![
            row(7, Some(1), Some(1)),
            row(7, Some(1), Some(2)),
            row(7, Some(2), Some(3)),
            row(7, Some(2), Some(4)),
            row(7, Some(2), Some(5)),
            row(7, Some(3), Some(6)),
        ];
        let plan = DeletePlan::from_rows(&rows).unwrap();

        assert_eq!(plan.message_ids_with_images, vec![1, 2, 3]);
        assert_eq!(plan.operation_count(), 5);
    }

    #[test]
    fn image_deletes_preserve_message_order() {
        let rows = vec![
            row(1, Some(30), Some(1)),
            row(1, Some(10), Some(2)),
            row(1, Some(20), Some(3)),
        ];
        let plan = DeletePlan::from_rows(&rows).unwrap();

        assert_eq!(plan.message_ids_with_images, vec![30, 10, 20]);
    }

    #[test]
    fn decoded_size_counts_payload_bytes() {
        let payload = BASE64_STANDARD.encode([0u8; 1000]);
        assert_eq!(decoded_size(&payload).unwrap(), 1000);
    }

    #[test]
    fn decoded_size_rejects_invalid_base64() {
        assert!(decoded_size("not base64!").is_err());
    }
}
