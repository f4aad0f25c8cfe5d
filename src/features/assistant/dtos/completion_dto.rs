use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request DTO for answering a question through a provider adapter
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequestDto {
    /// Base instruction prompt prepended to every request
    #[serde(default)]
    pub base_prompt: String,
    pub question: Option<String>,
    /// Retrieval context partition; absent or "none" skips retrieval
    #[serde(default)]
    pub namespace: Option<String>,
    pub selected_model: Option<ModelSelectorDto>,
    #[serde(default)]
    pub chat_history: Vec<ChatTurnDto>,
}

/// Category-tagged model selector
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ModelSelectorDto {
    #[serde(default)]
    pub category: String,
    pub value: Option<String>,
}

/// One prior question/answer turn
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatTurnDto {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}
