use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

use super::sse_data_lines;
use crate::domain::registry::Provider;
use crate::domain::{
    ChatClient, ChatRequest, ChatResponse, ChatStream, DomainError, FinishReason, Message,
    MessageRole, ResponseFormat, StreamChunk, ToolCall, ToolCallDelta, Usage,
};
use crate::infrastructure::http::{upstream_error, HttpClientTrait};

/// Client for the Google Gemini generateContent API
///
/// Function calls arrive as complete parts rather than argument fragments,
/// and call ids do not exist on this wire; they are synthesized locally so
/// tool results can be correlated.
#[derive(Debug)]
pub struct GoogleClient<C: HttpClientTrait> {
    client: C,
    provider: &'static Provider,
    model: String,
    api_key: String,
}

impl<C: HttpClientTrait> GoogleClient<C> {
    pub fn new(
        client: C,
        provider: &'static Provider,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            provider,
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.provider.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.provider.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![("Content-Type", "application/json")]
    }

    fn build_request(&self, request: &ChatRequest) -> serde_json::Value {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in &request.messages {
            match message.role {
                MessageRole::System => {
                    system_parts.push(serde_json::json!({"text": message.content}));
                }
                MessageRole::User => {
                    contents.push(serde_json::json!({
                        "role": "user",
                        "parts": [{"text": message.content}],
                    }));
                }
                MessageRole::Assistant => {
                    let mut parts = Vec::new();
                    if !message.content.is_empty() {
                        parts.push(serde_json::json!({"text": message.content}));
                    }
                    for tc in &message.tool_calls {
                        let args: serde_json::Value =
                            serde_json::from_str(&tc.arguments).unwrap_or(serde_json::json!({}));
                        parts.push(serde_json::json!({
                            "functionCall": {"name": tc.name, "args": args},
                        }));
                    }
                    contents.push(serde_json::json!({"role": "model", "parts": parts}));
                }
                MessageRole::Tool => {
                    contents.push(serde_json::json!({
                        "role": "user",
                        "parts": [{
                            "functionResponse": {
                                "name": message.name,
                                "response": {"content": message.content},
                            }
                        }],
                    }));
                }
            }
        }

        let mut body = serde_json::json!({"contents": contents});

        if !system_parts.is_empty() {
            body["systemInstruction"] = serde_json::json!({"parts": system_parts});
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temp) = request.temperature {
            generation_config.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), serde_json::json!(max_tokens));
        }
        if let Some(ResponseFormat::JsonSchema { schema, .. }) = &request.response_format {
            generation_config.insert(
                "responseMimeType".to_string(),
                serde_json::json!("application/json"),
            );
            generation_config.insert("responseSchema".to_string(), schema.clone());
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = serde_json::Value::Object(generation_config);
        }

        if !request.tools.is_empty() {
            let declarations: Vec<serde_json::Value> = request
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                })
                .collect();
            body["tools"] = serde_json::json!([{"functionDeclarations": declarations}]);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatResponse, DomainError> {
        let response: WireResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::upstream_unavailable(
                self.provider.id,
                format!("failed to parse response: {}", e),
            )
        })?;

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            DomainError::upstream_unavailable(self.provider.id, "no candidates in response")
        })?;

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();

        if let Some(content) = candidate.content {
            for part in content.parts {
                if let Some(text) = part.text {
                    text_parts.push(text);
                }
                if let Some(call) = part.function_call {
                    tool_calls.push(ToolCall::new(
                        synthesize_call_id(),
                        call.name,
                        call.args.to_string(),
                    ));
                }
            }
        }

        let has_tool_calls = !tool_calls.is_empty();
        let message = if has_tool_calls {
            Message::assistant_with_tool_calls(text_parts.join(""), tool_calls)
        } else {
            Message::assistant(text_parts.join(""))
        };

        let mut chat_response = ChatResponse::new(Uuid::new_v4().to_string(), message);

        let finish_reason = if has_tool_calls {
            FinishReason::ToolCalls
        } else {
            parse_finish_reason(candidate.finish_reason.as_deref())
        };
        chat_response = chat_response.with_finish_reason(finish_reason);

        if let Some(usage) = response.usage_metadata {
            chat_response = chat_response.with_usage(Usage::new(
                usage.prompt_token_count,
                usage.candidates_token_count,
            ));
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> ChatClient for GoogleClient<C> {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, DomainError> {
        let mut req = request;
        req.stream = false;

        let url = self.generate_url();
        let body = self.build_request(&req);
        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| upstream_error(self.provider.id, e))?;

        self.parse_response(response)
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, DomainError> {
        let mut req = request;
        req.stream = true;

        let url = self.stream_url();
        let body = self.build_request(&req);
        let byte_stream = self
            .client
            .post_json_stream(&url, self.headers(), &body)
            .await
            .map_err(|e| upstream_error(self.provider.id, e))?;

        let provider_id = self.provider.id;
        let stream = sse_data_lines(byte_stream)
            .scan(0usize, move |next_index, result| {
                let item = match result {
                    Ok(data) => parse_stream_data(&data, next_index),
                    Err(e) => Some(Err(upstream_error(provider_id, e))),
                };
                futures::future::ready(Some(item))
            })
            .filter_map(futures::future::ready);

        Ok(Box::pin(stream))
    }

    fn provider_id(&self) -> &'static str {
        self.provider.id
    }
}

fn synthesize_call_id() -> String {
    format!("call_{}", Uuid::new_v4().simple())
}

fn parse_stream_data(data: &str, next_index: &mut usize) -> Option<Result<StreamChunk, DomainError>> {
    let response: WireResponse = serde_json::from_str(data).ok()?;
    let candidate = response.candidates.into_iter().next()?;

    let mut chunk = StreamChunk::default();

    if let Some(content) = candidate.content {
        for part in content.parts {
            if let Some(text) = part.text {
                let merged = match chunk.delta.take() {
                    Some(existing) => existing + &text,
                    None => text,
                };
                chunk = chunk.with_delta(merged);
            }
            if let Some(call) = part.function_call {
                let index = *next_index;
                *next_index += 1;
                chunk = chunk.with_tool_call(ToolCallDelta {
                    index,
                    id: None,
                    name: Some(call.name),
                    arguments: call.args.to_string(),
                });
            }
        }
    }

    if let Some(reason) = candidate.finish_reason {
        chunk = chunk.with_finish_reason(parse_finish_reason(Some(&reason)));
    }

    if chunk.delta.is_none() && chunk.tool_calls.is_empty() && chunk.finish_reason.is_none() {
        return None;
    }

    Some(Ok(chunk))
}

fn parse_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("STOP") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") | Some("RECITATION") => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    }
}

// Wire types

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
struct WirePart {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<WireFunctionCall>,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::domain::registry;
    use crate::infrastructure::http::mock::MockHttpClient;

    const TEST_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=g-test";

    fn client(http: MockHttpClient) -> GoogleClient<MockHttpClient> {
        GoogleClient::new(
            http,
            registry::get_provider("google").unwrap(),
            "gemini-1.5-flash",
            "g-test",
        )
    }

    #[tokio::test]
    async fn test_chat() {
        let mock_response = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello from Gemini"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 4}
        });

        let provider = client(MockHttpClient::new().with_json_response(TEST_URL, mock_response));

        let response = provider
            .chat(ChatRequest::builder().user("Hello!").build())
            .await
            .unwrap();

        assert_eq!(response.content(), "Hello from Gemini");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 9);
    }

    #[tokio::test]
    async fn test_chat_function_call_gets_synthesized_id() {
        let mock_response = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "open_meteo_weather", "args": {"input": "Paris"}}}
                ]},
                "finishReason": "STOP"
            }]
        });

        let provider = client(MockHttpClient::new().with_json_response(TEST_URL, mock_response));

        let response = provider
            .chat(ChatRequest::builder().user("Weather in Paris?").build())
            .await
            .unwrap();

        assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(response.message.tool_calls.len(), 1);
        assert!(response.message.tool_calls[0].id.starts_with("call_"));
    }

    #[tokio::test]
    async fn test_chat_stream() {
        let stream_url = "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:streamGenerateContent?alt=sse&key=g-test";
        let chunks = vec![Bytes::from(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}]}\n\n\
             data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"lo\"}]},\"finishReason\":\"STOP\"}]}\n\n",
        )];

        let provider = client(MockHttpClient::new().with_stream_response(stream_url, chunks));

        let stream = provider
            .chat_stream(ChatRequest::builder().user("Hello!").build())
            .await
            .unwrap();

        let collected: Vec<StreamChunk> = stream.map(|r| r.unwrap()).collect().await;
        let deltas: Vec<&str> = collected
            .iter()
            .filter_map(|c| c.delta.as_deref())
            .collect();

        assert_eq!(deltas, vec!["Hel", "lo"]);
    }

    #[test]
    fn test_build_request_shapes() {
        let provider = client(MockHttpClient::new());

        let request = ChatRequest::builder()
            .system("Be terse")
            .user("Hi")
            .temperature(0.7)
            .build();

        let body = provider.build_request(&request);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be terse");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["generationConfig"]["temperature"], 0.7);
    }

    #[test]
    fn test_build_request_tool_result_roundtrip() {
        let provider = client(MockHttpClient::new());

        let request = ChatRequest::new(vec![
            Message::user("Weather in Paris?"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new("call_1", "open_meteo_weather", r#"{"input":"Paris"}"#)],
            ),
            Message::tool("call_1", "open_meteo_weather", "Temperature: 21 C"),
        ]);

        let body = provider.build_request(&request);
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(
            contents[1]["parts"][0]["functionCall"]["name"],
            "open_meteo_weather"
        );
        assert_eq!(
            contents[2]["parts"][0]["functionResponse"]["response"]["content"],
            "Temperature: 21 C"
        );
    }
}
