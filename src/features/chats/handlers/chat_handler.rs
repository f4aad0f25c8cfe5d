use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::Method,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::chats::dtos::{
    AppendMessageDto, ChatResponseDto, CreateChatDto, MessageResponseDto,
};
use crate::features::chats::services::ChatService;
use crate::shared::constants::{TITLE_MAX_CHARS, TITLE_MIN_CHARS};
use crate::shared::types::MessageResponse;

/// List all chats
#[utoipa::path(
    get,
    path = "/api/chats",
    responses(
        (status = 200, description = "List of chats", body = Vec<ChatResponseDto>),
    ),
    tag = "chats"
)]
pub async fn list_chats(
    State(service): State<Arc<ChatService>>,
) -> Result<Json<Vec<ChatResponseDto>>> {
    let chats = service.list().await?;
    Ok(Json(chats))
}

/// Create a chat
#[utoipa::path(
    post,
    path = "/api/chats",
    request_body = CreateChatDto,
    responses(
        (status = 200, description = "Chat created", body = ChatResponseDto),
        (status = 400, description = "Invalid title")
    ),
    tag = "chats"
)]
pub async fn create_chat(
    State(service): State<Arc<ChatService>>,
    AppJson(dto): AppJson<CreateChatDto>,
) -> Result<Json<ChatResponseDto>> {
    dto.validate().map_err(|_| {
        AppError::BadRequest("Title must be a string between 1 and 255 characters".to_string())
    })?;

    let chat = service.create(dto).await?;
    Ok(Json(chat))
}

/// Entry point for the conversation resource. Method dispatch happens here
/// so unsupported methods get the fixed 405 with the Allow header, and the
/// identifier is validated before any store access.
pub async fn chat_entry(
    State(service): State<Arc<ChatService>>,
    Path(chat_id): Path<String>,
    method: Method,
    body: Bytes,
) -> Result<Json<MessageResponse>> {
    if method != Method::DELETE && method != Method::PUT {
        return Err(AppError::MethodNotAllowed {
            method: method.to_string(),
        });
    }

    let chat_id = parse_chat_id(&chat_id)?;

    if method == Method::DELETE {
        delete_chat(&service, chat_id).await
    } else {
        let title = validate_title_body(&body)?;
        update_chat_title(&service, chat_id, &title).await
    }
}

/// Delete a chat and all associated data
#[utoipa::path(
    delete,
    path = "/api/chats/{id}",
    params(
        ("id" = i64, Path, description = "Chat identifier")
    ),
    responses(
        (status = 200, description = "Chat deleted", body = MessageResponse),
        (status = 400, description = "Invalid chat ID"),
        (status = 404, description = "Chat not found"),
        (status = 405, description = "Method not allowed")
    ),
    tag = "chats"
)]
pub async fn delete_chat(service: &ChatService, chat_id: i64) -> Result<Json<MessageResponse>> {
    service.delete_cascade(chat_id).await?;
    Ok(Json(MessageResponse::new(
        "Chat and all associated data deleted successfully",
    )))
}

/// Update a chat's title
#[utoipa::path(
    put,
    path = "/api/chats/{id}",
    params(
        ("id" = i64, Path, description = "Chat identifier")
    ),
    responses(
        (status = 200, description = "Title updated", body = MessageResponse),
        (status = 400, description = "Missing or invalid title"),
        (status = 404, description = "Chat not found"),
        (status = 405, description = "Method not allowed")
    ),
    tag = "chats"
)]
pub async fn update_chat_title(
    service: &ChatService,
    chat_id: i64,
    title: &str,
) -> Result<Json<MessageResponse>> {
    service.update_title(chat_id, title).await?;
    Ok(Json(MessageResponse::new("Chat title updated successfully")))
}

/// List messages of a chat
#[utoipa::path(
    get,
    path = "/api/chats/{id}/messages",
    params(
        ("id" = i64, Path, description = "Chat identifier")
    ),
    responses(
        (status = 200, description = "Messages with their images", body = Vec<MessageResponseDto>),
        (status = 400, description = "Invalid chat ID"),
        (status = 404, description = "Chat not found")
    ),
    tag = "chats"
)]
pub async fn list_messages(
    State(service): State<Arc<ChatService>>,
    Path(chat_id): Path<String>,
) -> Result<Json<Vec<MessageResponseDto>>> {
    let chat_id = parse_chat_id(&chat_id)?;
    let messages = service.list_messages(chat_id).await?;
    Ok(Json(messages))
}

/// Append one exchange to a chat
#[utoipa::path(
    post,
    path = "/api/chats/{id}/messages",
    params(
        ("id" = i64, Path, description = "Chat identifier")
    ),
    request_body = AppendMessageDto,
    responses(
        (status = 200, description = "Message appended", body = MessageResponseDto),
        (status = 400, description = "Invalid chat ID or payload"),
        (status = 404, description = "Chat not found")
    ),
    tag = "chats"
)]
pub async fn append_message(
    State(service): State<Arc<ChatService>>,
    Path(chat_id): Path<String>,
    AppJson(dto): AppJson<AppendMessageDto>,
) -> Result<Json<MessageResponseDto>> {
    let chat_id = parse_chat_id(&chat_id)?;
    let message = service.append_message(chat_id, dto).await?;
    Ok(Json(message))
}

/// The path identifier must be a positive integer; anything else fails
/// before the store is touched.
fn parse_chat_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::BadRequest("Invalid chat ID".to_string()))
}

/// Validate the PUT body. The exact failure message depends on whether the
/// title is absent or present with the wrong shape, so the raw JSON value is
/// inspected instead of deserializing into a typed DTO.
fn validate_title_body(body: &[u8]) -> Result<String> {
    let value =
        serde_json::from_slice::<serde_json::Value>(body).unwrap_or(serde_json::Value::Null);

    let title = match value.get("title") {
        None | Some(serde_json::Value::Null) => {
            return Err(AppError::BadRequest("Title is required".to_string()))
        }
        Some(title) => title,
    };

    let invalid = || {
        AppError::BadRequest("Title must be a string between 1 and 255 characters".to_string())
    };

    let title = title.as_str().ok_or_else(invalid)?.trim();
    let length = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&length) {
        return Err(invalid());
    }

    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_chat_id_accepts_positive_integers() {
        assert_eq!(parse_chat_id("1").unwrap(), 1);
        assert_eq!(parse_chat_id("42").unwrap(), 42);
    }

    #[test]
    fn parse_chat_id_rejects_malformed_input() {
        for raw in ["invalid", "", "1.5", "-1", "0", "1abc"] {
            let err = parse_chat_id(raw).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Invalid chat ID"));
        }
    }

    #[test]
    fn title_missing_from_body() {
        for body in [&b"{}"[..], b"", b"{\"title\": null}", b"not json"] {
            let err = validate_title_body(body).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Title is required"));
        }
    }

    #[test]
    fn title_with_wrong_type_or_length() {
        let too_long = format!("{{\"title\": \"{}\"}}", "x".repeat(256));
        for body in [
            &b"{\"title\": 123}"[..],
            b"{\"title\": true}",
            b"{\"title\": [\"a\"]}",
            b"{\"title\": \"\"}",
            too_long.as_bytes(),
        ] {
            let err = validate_title_body(body).unwrap_err();
            assert!(matches!(
                err,
                AppError::BadRequest(ref msg)
                    if msg == "Title must be a string between 1 and 255 characters"
            ));
        }
    }

    #[test]
    fn title_is_trimmed() {
        let title = validate_title_body(b"{\"title\": \"  My chat  \"}").unwrap();
        assert_eq!(title, "My chat");
    }

    #[test]
    fn title_boundary_lengths_are_accepted() {
        let one = validate_title_body(b"{\"title\": \"a\"}").unwrap();
        assert_eq!(one, "a");

        let max = format!("{{\"title\": \"{}\"}}", "x".repeat(255));
        let title = validate_title_body(max.as_bytes()).unwrap();
        assert_eq!(title.chars().count(), 255);
    }
}
