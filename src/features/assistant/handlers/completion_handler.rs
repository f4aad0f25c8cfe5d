use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::assistant::dtos::CompletionRequestDto;
use crate::features::assistant::services::DispatchService;

/// Answer a question through the selected provider
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = CompletionRequestDto,
    responses(
        (status = 200, description = "Answer text", body = String),
        (status = 400, description = "No question in the request"),
        (status = 500, description = "Missing model, configuration or provider failure")
    ),
    tag = "assistant"
)]
pub async fn answer_question(
    State(service): State<Arc<DispatchService>>,
    AppJson(dto): AppJson<CompletionRequestDto>,
) -> Result<Json<String>> {
    let answer = service.answer(dto).await?;
    Ok(Json(answer))
}
