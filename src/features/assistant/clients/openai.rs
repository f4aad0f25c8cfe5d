use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, Result};

use super::WireMessage;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection details for any OpenAI-compatible chat-completion endpoint
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Send one chat completion request. Returns the first choice's content;
/// `None` when the provider answered without content.
pub async fn chat_completion(
    http: &Client,
    config: &OpenAiCompatConfig,
    model: &str,
    messages: &[WireMessage],
) -> Result<Option<String>> {
    let body = ChatCompletionRequest { model, messages };

    let response = http
        .post(format!("{}/chat/completions", config.base_url))
        .bearer_auth(&config.api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Chat completion request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!(
            "Chat completion request failed with status {}: {}",
            status, detail
        )));
    }

    let parsed: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("Invalid chat completion response: {}", e)))?;

    Ok(parsed.choices.into_iter().next().and_then(|c| c.message.content))
}
