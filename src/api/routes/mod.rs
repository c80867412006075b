//! Request dispatch: the chat endpoints and their shared validation

pub mod agents;
pub mod chat;
pub mod providers;
pub mod structured_output;
pub mod test_provider;

use std::convert::Infallible;

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::error;

use super::state::AppState;
use crate::domain::registry::{self, Model, Provider};
use crate::domain::{ChatStream, DomainError};

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/chat/agents", post(agents::chat_agents))
        .route(
            "/chat/structured_output",
            post(structured_output::structured_output),
        )
        .route("/test-provider", post(test_provider::test_provider))
        .route("/providers", get(providers::list_providers))
}

/// A validated (provider, model, credential) triple for one request
pub(crate) struct ResolvedTarget {
    pub provider: &'static Provider,
    pub model: &'static Model,
    pub api_key: String,
}

/// Validate the addressing fields of a request before any network call
///
/// Provider and model fall back to the configured defaults. The credential
/// is the request's key when present, else the provider's environment
/// default; with neither, the request fails.
pub(crate) fn resolve_target(
    state: &AppState,
    provider: Option<&str>,
    model: Option<&str>,
    api_key: Option<&str>,
) -> Result<ResolvedTarget, DomainError> {
    let provider_id = provider
        .filter(|p| !p.is_empty())
        .unwrap_or(state.chat.default_provider.as_str());
    let model_id = model
        .filter(|m| !m.is_empty())
        .unwrap_or(state.chat.default_model.as_str());

    let provider = registry::get_provider(provider_id)
        .ok_or_else(|| DomainError::unknown_provider(provider_id))?;
    let model = provider
        .model(model_id)
        .ok_or_else(|| DomainError::unknown_model(provider_id, model_id))?;

    let api_key = api_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| state.provider_keys.get(provider.id).cloned())
        .ok_or(DomainError::MissingCredential)?;

    Ok(ResolvedTarget {
        provider,
        model,
        api_key,
    })
}

/// Relay a chunk stream as a plain-text body, content deltas only
///
/// Forwarding stops when the client goes away; a mid-stream upstream error
/// ends the body (the status line has already been sent).
pub(crate) fn text_stream_response(stream: ChatStream) -> Response {
    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(32);

    tokio::spawn(async move {
        let mut stream = stream;

        while let Some(chunk_result) = stream.next().await {
            match chunk_result {
                Ok(chunk) => {
                    let Some(delta) = chunk.delta else { continue };
                    if delta.is_empty() {
                        continue;
                    }

                    if tx.send(Ok(Bytes::from(delta))).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("stream error: {}", e);
                    break;
                }
            }
        }
    });

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(ReceiverStream::new(rx)),
    )
        .into_response()
}
