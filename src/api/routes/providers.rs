//! Catalog listing for settings UIs

use axum::response::IntoResponse;
use serde::Serialize;

use crate::api::types::Json;
use crate::domain::registry;

#[derive(Debug, Serialize)]
struct ProviderInfo {
    id: &'static str,
    name: &'static str,
    api_key_env: &'static str,
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    id: &'static str,
    name: &'static str,
    max_tokens: u32,
    context_window: u32,
}

/// GET /api/providers
pub async fn list_providers() -> impl IntoResponse {
    let providers: Vec<ProviderInfo> = registry::providers()
        .iter()
        .map(|p| ProviderInfo {
            id: p.id,
            name: p.name,
            api_key_env: p.api_key_env,
            models: p
                .models
                .iter()
                .map(|m| ModelInfo {
                    id: m.id,
                    name: m.name,
                    max_tokens: m.max_tokens,
                    context_window: m.context_window,
                })
                .collect(),
        })
        .collect();

    Json(providers)
}
