use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, Result};
use crate::features::assistant::dtos::ChatTurnDto;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SelfHostedRequest<'a> {
    base_prompt: &'a str,
    question: &'a str,
    context: &'a str,
    chat_history: &'a [ChatTurnDto],
    model: &'a str,
}

#[derive(Deserialize)]
struct SelfHostedResponse {
    answer: Option<String>,
}

/// Send one request to a self-hosted inference server. The caller resolves
/// the full endpoint URL from configuration before any network interaction.
pub async fn chat(
    http: &Client,
    url: &str,
    base_prompt: &str,
    chat_history: &[ChatTurnDto],
    question: &str,
    context: &str,
    model: &str,
) -> Result<Option<String>> {
    let body = SelfHostedRequest {
        base_prompt,
        question,
        context,
        chat_history,
        model,
    };

    let response = http
        .post(url)
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Self-hosted request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!(
            "Self-hosted request failed with status {}: {}",
            status, detail
        )));
    }

    let parsed: SelfHostedResponse = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("Invalid self-hosted response: {}", e)))?;

    Ok(parsed.answer)
}
