use reqwest::Client;

use crate::core::error::Result;

use super::openai::{self, OpenAiCompatConfig};
use super::WireMessage;

/// Groq exposes an OpenAI-compatible chat-completion surface
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub async fn chat_completion(
    http: &Client,
    api_key: &str,
    model: &str,
    messages: &[WireMessage],
) -> Result<Option<String>> {
    let config = OpenAiCompatConfig {
        api_key: api_key.to_string(),
        base_url: GROQ_BASE_URL.to_string(),
    };

    openai::chat_completion(http, &config, model, messages).await
}
