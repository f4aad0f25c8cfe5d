use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: u32,
    namespace: &'a str,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    metadata: Option<MatchMetadata>,
}

#[derive(Deserialize)]
struct MatchMetadata {
    text: Option<String>,
}

/// Fetch context text for an embedded question from the vector store.
/// Matches are joined in score order as returned by the store.
pub async fn fetch_context(
    http: &Client,
    base_url: &str,
    api_key: &str,
    vector: &[f32],
    namespace: &str,
    top_k: u32,
) -> Result<String> {
    let body = QueryRequest {
        vector,
        top_k,
        namespace,
        include_metadata: true,
    };

    let response = http
        .post(format!("{}/query", base_url))
        .header("Api-Key", api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Vector store query failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!(
            "Vector store query failed with status {}: {}",
            status, detail
        )));
    }

    let parsed: QueryResponse = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("Invalid vector store response: {}", e)))?;

    let chunks: Vec<String> = parsed
        .matches
        .into_iter()
        .filter_map(|m| m.metadata.and_then(|meta| meta.text))
        .collect();

    Ok(chunks.join("\n\n"))
}
