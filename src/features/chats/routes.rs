use std::sync::Arc;

use axum::{
    routing::{any, get},
    Router,
};

use crate::features::chats::handlers;
use crate::features::chats::services::ChatService;

/// Create routes for the chats feature.
///
/// The conversation resource is routed through a single entry point so the
/// handler controls method dispatch and the 405 contract.
pub fn routes(service: Arc<ChatService>) -> Router {
    Router::new()
        .route(
            "/api/chats",
            get(handlers::list_chats).post(handlers::create_chat),
        )
        .route("/api/chats/{id}", any(handlers::chat_entry))
        .route(
            "/api/chats/{id}/messages",
            get(handlers::list_messages).post(handlers::append_message),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::core::database::lazy_test_pool;

    /// Server backed by a pool that never connects; every request below must
    /// be rejected before any store access.
    fn test_server() -> TestServer {
        let service = Arc::new(ChatService::new(lazy_test_pool()));
        TestServer::new(routes(service)).expect("test server")
    }

    #[tokio::test]
    async fn unsupported_methods_yield_405_with_allow_header() {
        let server = test_server();

        for method in [Method::GET, Method::HEAD, Method::POST, Method::PATCH] {
            let response = server.method(method.clone(), "/api/chats/1").await;

            assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(
                response
                    .headers()
                    .get("allow")
                    .and_then(|v| v.to_str().ok()),
                Some("DELETE, PUT")
            );
        }
    }

    #[tokio::test]
    async fn unsupported_method_names_the_method() {
        let server = test_server();

        let response = server.method(Method::PATCH, "/api/chats/1").await;
        let body: Value = response.json();
        assert_eq!(body["error"], "Method PATCH Not Allowed");
    }

    #[tokio::test]
    async fn unsupported_method_wins_over_invalid_id() {
        let server = test_server();

        let response = server.method(Method::GET, "/api/chats/invalid").await;
        assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn delete_with_invalid_id_is_rejected_without_store_access() {
        let server = test_server();

        let response = server.delete("/api/chats/invalid").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid chat ID");
    }

    #[tokio::test]
    async fn put_with_invalid_id_is_rejected_without_store_access() {
        let server = test_server();

        let response = server
            .put("/api/chats/-3")
            .json(&json!({"title": "New title"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid chat ID");
    }

    #[tokio::test]
    async fn put_without_title_is_rejected() {
        let server = test_server();

        let response = server.put("/api/chats/1").json(&json!({})).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Title is required");
    }

    #[tokio::test]
    async fn put_without_body_is_rejected() {
        let server = test_server();

        let response = server.put("/api/chats/1").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Title is required");
    }

    #[tokio::test]
    async fn put_with_non_string_title_is_rejected() {
        let server = test_server();

        let response = server.put("/api/chats/1").json(&json!({"title": 123})).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["error"],
            "Title must be a string between 1 and 255 characters"
        );
    }

    #[tokio::test]
    async fn put_with_overlong_title_is_rejected() {
        let server = test_server();

        let response = server
            .put("/api/chats/1")
            .json(&json!({"title": "x".repeat(256)}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["error"],
            "Title must be a string between 1 and 255 characters"
        );
    }
}
