use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::assistant::handlers;
use crate::features::assistant::services::DispatchService;

/// Create routes for the assistant feature
pub fn routes(service: Arc<DispatchService>) -> Router {
    Router::new()
        .route("/api/chat", post(handlers::answer_question))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::core::config::AiConfig;

    fn test_server() -> TestServer {
        let service = Arc::new(DispatchService::new(AiConfig::empty()));
        TestServer::new(routes(service)).expect("test server")
    }

    #[tokio::test]
    async fn missing_question_yields_400() {
        let server = test_server();

        let response = server
            .post("/api/chat")
            .json(&json!({
                "basePrompt": "You are helpful.",
                "selectedModel": {"category": "openai", "value": "gpt-4"}
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "No question in the request");
    }

    #[tokio::test]
    async fn missing_model_selector_yields_500() {
        let server = test_server();

        let response = server
            .post("/api/chat")
            .json(&json!({"question": "What is Rust?"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["error"], "Something went wrong");
    }

    #[tokio::test]
    async fn unknown_category_yields_500() {
        let server = test_server();

        let response = server
            .post("/api/chat")
            .json(&json!({
                "question": "What is Rust?",
                "selectedModel": {"category": "mystery", "value": "m1"}
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid model category");
    }

    #[tokio::test]
    async fn self_hosted_without_url_yields_500_naming_the_gap() {
        let server = test_server();

        let response = server
            .post("/api/chat")
            .json(&json!({
                "question": "What is Rust?",
                "selectedModel": {"category": "hf-large", "value": "flan-ul2"}
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(
            body["error"],
            "Url address for posting the data to flan-ul2 is missing"
        );
    }
}
