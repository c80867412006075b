//! Credential test endpoint

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, TestProviderBody};
use crate::domain::registry;
use crate::infrastructure::probe::{ConnectivityProber, ProbeOutcome};

/// POST /api/test-provider
///
/// Syntactic key check first (no network), then exactly one live probe.
pub async fn test_provider(
    State(state): State<AppState>,
    Json(body): Json<TestProviderBody>,
) -> Result<Response, ApiError> {
    let provider_id = body.provider.as_deref().map(str::trim).unwrap_or_default();
    let api_key = body.api_key.as_deref().map(str::trim).unwrap_or_default();

    if provider_id.is_empty() || api_key.is_empty() {
        return Err(ApiError::bad_request("Provider and API key are required"));
    }

    let provider = registry::get_provider(provider_id)
        .ok_or_else(|| ApiError::bad_request("Unsupported provider"))?;

    if !registry::validate_key(provider.id, api_key) {
        return Err(ApiError::bad_request(format!(
            "API key format is invalid for provider {}",
            provider.id
        )));
    }

    let prober = ConnectivityProber::new(state.http.clone());

    match prober.probe(provider, api_key).await {
        ProbeOutcome::Valid => {
            info!(provider = provider.id, "credential probe succeeded");
            Ok(Json(serde_json::json!({
                "success": true,
                "message": format!("API key is valid for {}", provider.id),
            }))
            .into_response())
        }
        ProbeOutcome::Invalid(reason) | ProbeOutcome::NetworkError(reason) => {
            Err(ApiError::bad_request(reason))
        }
    }
}
