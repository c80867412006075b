use std::sync::Arc;

use super::{AnthropicClient, GoogleClient, OpenAiCompatClient};
use crate::domain::registry::{self, WireProtocol};
use crate::domain::{ChatClient, DomainError};
use crate::infrastructure::http::{HttpClient, HttpClientTrait};

/// Factory producing a configured client for a (provider, model, key) triple
///
/// Construction never performs network I/O; the returned handle is bound to
/// one request's credential and is not reused.
#[derive(Debug)]
pub struct ClientFactory;

impl ClientFactory {
    pub fn create(
        provider_id: &str,
        model_id: &str,
        api_key: &str,
    ) -> Result<Arc<dyn ChatClient>, DomainError> {
        Self::create_with(HttpClient::new(), provider_id, model_id, api_key)
    }

    /// Variant taking an explicit HTTP client, used by tests
    pub fn create_with<C>(
        http: C,
        provider_id: &str,
        model_id: &str,
        api_key: &str,
    ) -> Result<Arc<dyn ChatClient>, DomainError>
    where
        C: HttpClientTrait + 'static,
    {
        let provider = registry::get_provider(provider_id)
            .ok_or_else(|| DomainError::unknown_provider(provider_id))?;
        let model = provider
            .model(model_id)
            .ok_or_else(|| DomainError::unknown_model(provider_id, model_id))?;

        let client: Arc<dyn ChatClient> = match provider.protocol {
            WireProtocol::OpenAiCompat => {
                Arc::new(OpenAiCompatClient::new(http, provider, model.id, api_key))
            }
            WireProtocol::Anthropic => {
                Arc::new(AnthropicClient::new(http, provider, model.id, api_key))
            }
            WireProtocol::Google => Arc::new(GoogleClient::new(http, provider, model.id, api_key)),
        };

        Ok(client)
    }
}
