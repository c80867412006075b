use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::health;
use super::routes;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .nest("/api", routes::create_api_router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        create_router(AppState::default())
    }

    async fn post_json(
        app: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap();

        (status, json)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chat_without_api_key_is_literal_400() {
        let (status, body) = post_json(
            app(),
            "/api/chat",
            serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "API key is required"}));
    }

    #[tokio::test]
    async fn test_agents_without_api_key_is_literal_400() {
        let (status, body) = post_json(
            app(),
            "/api/chat/agents",
            serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "API key is required"}));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_400() {
        let (status, body) = post_json(
            app(),
            "/api/chat",
            serde_json::json!({
                "messages": [{"role": "user", "content": "hi"}],
                "provider": "acme",
                "apiKey": "some-key",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "Provider acme not found"}));
    }

    #[tokio::test]
    async fn test_unknown_model_is_400() {
        let (status, body) = post_json(
            app(),
            "/api/chat",
            serde_json::json!({
                "messages": [{"role": "user", "content": "hi"}],
                "provider": "openai",
                "model": "gpt-9",
                "apiKey": "sk-x",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({"error": "Model gpt-9 not found for provider openai"})
        );
    }

    #[tokio::test]
    async fn test_empty_messages_is_400() {
        let (status, body) = post_json(
            app(),
            "/api/chat",
            serde_json::json!({"messages": [], "apiKey": "sk-x"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Messages cannot be empty");
    }

    #[tokio::test]
    async fn test_test_provider_requires_both_fields() {
        let (status, body) = post_json(
            app(),
            "/api/test-provider",
            serde_json::json!({"provider": "openai"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Provider and API key are required");
    }

    #[tokio::test]
    async fn test_test_provider_rejects_bad_key_format_without_probing() {
        // "abc" fails the sk- prefix rule, so no live call is attempted
        let (status, body) = post_json(
            app(),
            "/api/test-provider",
            serde_json::json!({"provider": "openai", "apiKey": "abc"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "API key format is invalid for provider openai");
    }

    #[tokio::test]
    async fn test_providers_listing() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/providers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let providers = json.as_array().unwrap();

        assert_eq!(providers.len(), 6);
        assert_eq!(providers[0]["id"], "openai");
        assert!(providers[0]["models"].as_array().unwrap().len() >= 3);
    }
}
