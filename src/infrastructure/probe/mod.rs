//! Connectivity prober
//!
//! Confirms a credential is actually accepted upstream with exactly one
//! low-cost live call per invocation: a model-listing GET where the vendor
//! offers one, otherwise a one-token chat completion. Never retries.

use tracing::debug;

use crate::domain::registry::{Provider, WireProtocol};
use crate::infrastructure::http::{HttpClientTrait, HttpError, RawResponse};

/// Result of probing one provider with one credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Valid,
    Invalid(String),
    NetworkError(String),
}

impl ProbeOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

#[derive(Debug)]
pub struct ConnectivityProber<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> ConnectivityProber<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn probe(&self, provider: &Provider, api_key: &str) -> ProbeOutcome {
        debug!(provider = provider.id, "probing credential");

        let result = match provider.protocol {
            WireProtocol::OpenAiCompat if provider.id == "openai" => {
                let url = format!("{}/models", provider.base_url.trim_end_matches('/'));
                let auth = format!("Bearer {}", api_key);
                self.client
                    .get_raw(&url, vec![("Authorization", auth.as_str())])
                    .await
            }
            WireProtocol::OpenAiCompat => {
                let url = format!(
                    "{}/chat/completions",
                    provider.base_url.trim_end_matches('/')
                );
                let auth = format!("Bearer {}", api_key);
                let body = minimal_chat_body(provider);
                self.client
                    .post_raw(
                        &url,
                        vec![
                            ("Authorization", auth.as_str()),
                            ("Content-Type", "application/json"),
                        ],
                        &body,
                    )
                    .await
            }
            WireProtocol::Anthropic => {
                let url = format!("{}/v1/messages", provider.base_url.trim_end_matches('/'));
                let body = minimal_chat_body(provider);
                self.client
                    .post_raw(
                        &url,
                        vec![
                            ("x-api-key", api_key),
                            ("anthropic-version", "2023-06-01"),
                            ("Content-Type", "application/json"),
                        ],
                        &body,
                    )
                    .await
            }
            WireProtocol::Google => {
                let url = format!(
                    "{}/models?key={}",
                    provider.base_url.trim_end_matches('/'),
                    api_key
                );
                self.client.get_raw(&url, vec![]).await
            }
        };

        classify(provider, result)
    }
}

/// Smallest request the vendor will accept: first catalog model, one token
fn minimal_chat_body(provider: &Provider) -> serde_json::Value {
    let model = provider.models.first().map(|m| m.id).unwrap_or_default();
    serde_json::json!({
        "model": model,
        "messages": [{"role": "user", "content": "Hello"}],
        "max_tokens": 1,
    })
}

fn classify(provider: &Provider, result: Result<RawResponse, HttpError>) -> ProbeOutcome {
    match result {
        Ok(response) if response.is_success() => ProbeOutcome::Valid,
        Ok(response) => match response.status {
            401 | 403 => ProbeOutcome::Invalid("invalid credential".to_string()),
            429 => ProbeOutcome::Invalid("rate limited, try again later".to_string()),
            _ => ProbeOutcome::Invalid(format!(
                "{} API error: {}",
                provider.name, response.body
            )),
        },
        Err(e) => ProbeOutcome::NetworkError(format!(
            "Failed to connect to {} API: {}",
            provider.name, e
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry;
    use crate::infrastructure::http::mock::MockHttpClient;

    const OPENAI_MODELS_URL: &str = "https://api.openai.com/v1/models";
    const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
    const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

    #[tokio::test]
    async fn test_probe_openai_valid() {
        let http =
            MockHttpClient::new().with_raw_response(OPENAI_MODELS_URL, 200, r#"{"data":[]}"#);
        let prober = ConnectivityProber::new(http);

        let outcome = prober
            .probe(registry::get_provider("openai").unwrap(), "sk-good")
            .await;
        assert!(outcome.is_valid());
    }

    #[tokio::test]
    async fn test_probe_rejected_credential() {
        let http = MockHttpClient::new().with_raw_response(
            OPENAI_MODELS_URL,
            401,
            r#"{"error":"bad key"}"#,
        );
        let prober = ConnectivityProber::new(http);

        let outcome = prober
            .probe(registry::get_provider("openai").unwrap(), "sk-bad")
            .await;
        assert_eq!(outcome, ProbeOutcome::Invalid("invalid credential".to_string()));
    }

    #[tokio::test]
    async fn test_probe_rate_limited() {
        let http = MockHttpClient::new().with_raw_response(GROQ_CHAT_URL, 429, "slow down");
        let prober = ConnectivityProber::new(http);

        let outcome = prober
            .probe(registry::get_provider("groq").unwrap(), "gsk_x")
            .await;
        assert_eq!(
            outcome,
            ProbeOutcome::Invalid("rate limited, try again later".to_string())
        );
    }

    #[tokio::test]
    async fn test_probe_passes_through_vendor_message() {
        let http =
            MockHttpClient::new().with_raw_response(ANTHROPIC_URL, 404, "model unavailable");
        let prober = ConnectivityProber::new(http);

        let outcome = prober
            .probe(registry::get_provider("anthropic").unwrap(), "sk-ant-x")
            .await;
        match outcome {
            ProbeOutcome::Invalid(reason) => {
                assert!(reason.contains("model unavailable"));
                assert!(reason.contains("Anthropic"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_network_error() {
        let http = MockHttpClient::new().with_error(OPENAI_MODELS_URL, "connection refused");
        let prober = ConnectivityProber::new(http);

        let outcome = prober
            .probe(registry::get_provider("openai").unwrap(), "sk-x")
            .await;
        match outcome {
            ProbeOutcome::NetworkError(reason) => {
                assert!(reason.contains("connection refused"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_google_uses_listing() {
        let url = "https://generativelanguage.googleapis.com/v1beta/models?key=g-key";
        let http = MockHttpClient::new().with_raw_response(url, 200, r#"{"models":[]}"#);
        let prober = ConnectivityProber::new(http);

        let outcome = prober
            .probe(registry::get_provider("google").unwrap(), "g-key")
            .await;
        assert!(outcome.is_valid());
    }
}
