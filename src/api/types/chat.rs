//! Request and response bodies for the chat endpoints

use serde::{Deserialize, Serialize};

use crate::domain::Message;

/// One message as the browser sends it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub role: String,
    pub content: String,
}

/// Body shared by the chat, agents and structured-output endpoints
///
/// `provider` and `model` fall back to the configured defaults;
/// `thread_id` is accepted for client-side bookkeeping and ignored here.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequestBody {
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
    pub provider: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub show_intermediate_steps: bool,
    pub thread_id: Option<String>,
    #[serde(rename = "exaApiKey")]
    pub exa_api_key: Option<String>,
}

/// Body of the credential-test endpoint
#[derive(Debug, Deserialize)]
pub struct TestProviderBody {
    pub provider: Option<String>,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

/// Non-streaming agent response: the whole transcript in generation order
#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_body_field_names() {
        let body: ChatRequestBody = serde_json::from_str(
            r#"{
                "messages": [{"role": "user", "content": "hi"}],
                "provider": "anthropic",
                "model": "claude-3-opus-20240229",
                "apiKey": "sk-ant-x",
                "show_intermediate_steps": true,
                "exaApiKey": "exa-x"
            }"#,
        )
        .unwrap();

        assert_eq!(body.provider.as_deref(), Some("anthropic"));
        assert_eq!(body.api_key.as_deref(), Some("sk-ant-x"));
        assert!(body.show_intermediate_steps);
        assert_eq!(body.exa_api_key.as_deref(), Some("exa-x"));
    }

    #[test]
    fn test_chat_request_body_minimal() {
        let body: ChatRequestBody = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.messages.is_empty());
        assert!(body.api_key.is_none());
        assert!(!body.show_intermediate_steps);
    }
}
