use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, Result};

use super::openai::OPENAI_BASE_URL;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embed one text into a vector for context retrieval
pub async fn embed(http: &Client, api_key: &str, model: &str, input: &str) -> Result<Vec<f32>> {
    let body = EmbeddingRequest { model, input };

    let response = http
        .post(format!("{}/embeddings", OPENAI_BASE_URL))
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Embedding request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!(
            "Embedding request failed with status {}: {}",
            status, detail
        )));
    }

    let parsed: EmbeddingResponse = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("Invalid embedding response: {}", e)))?;

    parsed
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| AppError::Upstream("Embedding response contained no data".to_string()))
}
