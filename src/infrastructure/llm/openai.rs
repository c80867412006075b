use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;

use super::sse_data_lines;
use crate::domain::registry::Provider;
use crate::domain::{
    ChatClient, ChatRequest, ChatResponse, ChatStream, DomainError, FinishReason, Message,
    MessageRole, ResponseFormat, StreamChunk, ToolCall, ToolCallDelta, Usage,
};
use crate::infrastructure::http::{upstream_error, HttpClientTrait};

/// Client for OpenAI-compatible chat completion APIs
///
/// Serves openai itself plus the vendors that clone its surface (groq,
/// deepseek, fireworks); only the base URL differs.
#[derive(Debug)]
pub struct OpenAiCompatClient<C: HttpClientTrait> {
    client: C,
    provider: &'static Provider,
    model: String,
    auth_header: String,
}

impl<C: HttpClientTrait> OpenAiCompatClient<C> {
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
            auth_header: format!("Bearer {}", api_key.into()),
        }
    }

    fn chat_completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.provider.base_url.trim_end_matches('/')
        )
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, request: &ChatRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> =
            request.messages.iter().map(wire_message).collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": request.stream,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            let tools: Vec<serde_json::Value> = request
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = serde_json::json!(tools);
        }

        if let Some(ResponseFormat::JsonSchema { name, schema }) = &request.response_format {
            body["response_format"] = serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": name,
                    "strict": true,
                    "schema": schema,
                }
            });
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

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            DomainError::upstream_unavailable(self.provider.id, "no choices in response")
        })?;

        let content = choice.message.content.unwrap_or_default();
        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .into_iter()
            .map(|tc| ToolCall::new(tc.id, tc.function.name, tc.function.arguments))
            .collect();

        let message = if tool_calls.is_empty() {
            Message::assistant(content)
        } else {
            Message::assistant_with_tool_calls(content, tool_calls)
        };

        let mut chat_response = ChatResponse::new(response.id, message);

        if let Some(reason) = choice.finish_reason {
            chat_response = chat_response.with_finish_reason(parse_finish_reason(&reason));
        }

        if let Some(usage) = response.usage {
            chat_response =
                chat_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> ChatClient for OpenAiCompatClient<C> {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, DomainError> {
        let mut req = request;
        req.stream = false;

        let url = self.chat_completions_url();
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

        let url = self.chat_completions_url();
        let body = self.build_request(&req);
        let byte_stream = self
            .client
            .post_json_stream(&url, self.headers(), &body)
            .await
            .map_err(|e| upstream_error(self.provider.id, e))?;

        let provider_id = self.provider.id;
        let stream = sse_data_lines(byte_stream).filter_map(move |result| async move {
            match result {
                Ok(data) => parse_stream_data(&data),
                Err(e) => Some(Err(upstream_error(provider_id, e))),
            }
        });

        Ok(Box::pin(stream))
    }

    fn provider_id(&self) -> &'static str {
        self.provider.id
    }
}

fn wire_message(message: &Message) -> serde_json::Value {
    match message.role {
        MessageRole::System => serde_json::json!({
            "role": "system",
            "content": message.content,
        }),
        MessageRole::User => serde_json::json!({
            "role": "user",
            "content": message.content,
        }),
        MessageRole::Assistant => {
            let mut value = serde_json::json!({
                "role": "assistant",
                "content": message.content,
            });

            if message.has_tool_calls() {
                let calls: Vec<serde_json::Value> = message
                    .tool_calls
                    .iter()
                    .map(|tc| {
                        serde_json::json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": tc.arguments,
                            }
                        })
                    })
                    .collect();
                value["tool_calls"] = serde_json::json!(calls);
            }

            value
        }
        MessageRole::Tool => serde_json::json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id,
            "content": message.content,
        }),
    }
}

fn parse_stream_data(data: &str) -> Option<Result<StreamChunk, DomainError>> {
    if data.trim() == "[DONE]" {
        return Some(Ok(
            StreamChunk::default().with_finish_reason(FinishReason::Stop)
        ));
    }

    let chunk: WireStreamChunk = serde_json::from_str(data).ok()?;
    let choice = chunk.choices.into_iter().next()?;

    let mut stream_chunk = StreamChunk::default();

    if let Some(content) = choice.delta.content {
        stream_chunk = stream_chunk.with_delta(content);
    }

    for tc in choice.delta.tool_calls {
        let (name, arguments) = match tc.function {
            Some(f) => (f.name, f.arguments.unwrap_or_default()),
            None => (None, String::new()),
        };

        stream_chunk = stream_chunk.with_tool_call(ToolCallDelta {
            index: tc.index,
            id: tc.id,
            name,
            arguments,
        });
    }

    if let Some(reason) = choice.finish_reason {
        stream_chunk = stream_chunk.with_finish_reason(parse_finish_reason(&reason));
    }

    Some(Ok(stream_chunk))
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        _ => FinishReason::Stop,
    }
}

// Wire types

#[derive(Debug, Deserialize)]
struct WireResponse {
    id: String,
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireStreamChunk {
    choices: Vec<WireStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct WireStreamChoice {
    delta: WireDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCallDelta>,
}

#[derive(Debug, Deserialize)]
struct WireToolCallDelta {
    index: usize,
    id: Option<String>,
    function: Option<WireFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct WireFunctionDelta {
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::domain::registry;
    use crate::infrastructure::http::mock::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/chat/completions";

    fn client(http: MockHttpClient) -> OpenAiCompatClient<MockHttpClient> {
        OpenAiCompatClient::new(
            http,
            registry::get_provider("openai").unwrap(),
            "gpt-4o-mini",
            "sk-test",
        )
    }

    #[tokio::test]
    async fn test_chat() {
        let mock_response = serde_json::json!({
            "id": "chatcmpl-123",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello there!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
        });

        let provider = client(MockHttpClient::new().with_json_response(TEST_URL, mock_response));

        let request = ChatRequest::builder().user("Hello!").build();
        let response = provider.chat(request).await.unwrap();

        assert_eq!(response.id, "chatcmpl-123");
        assert_eq!(response.content(), "Hello there!");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 12);
    }

    #[tokio::test]
    async fn test_chat_with_tool_calls() {
        let mock_response = serde_json::json!({
            "id": "chatcmpl-456",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "calculator", "arguments": "{\"input\":\"2+2\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });

        let provider = client(MockHttpClient::new().with_json_response(TEST_URL, mock_response));

        let response = provider
            .chat(ChatRequest::builder().user("What is 2+2?").build())
            .await
            .unwrap();

        assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(response.message.tool_calls.len(), 1);
        assert_eq!(response.message.tool_calls[0].name, "calculator");
    }

    #[tokio::test]
    async fn test_chat_stream_content_chunks() {
        let chunks = vec![
            Bytes::from(
                "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n\
                 data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            ),
            Bytes::from("data: [DONE]\n\n"),
        ];

        let provider = client(MockHttpClient::new().with_stream_response(TEST_URL, chunks));

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

    #[tokio::test]
    async fn test_transport_failure_maps_to_unavailable() {
        let provider = client(MockHttpClient::new());
        // No mock registered: the mock reports a transport failure
        let result = provider
            .chat(ChatRequest::builder().user("Hello!").build())
            .await;

        assert!(matches!(
            result,
            Err(DomainError::UpstreamUnavailable { .. })
        ));
    }

    #[test]
    fn test_build_request_includes_tools_and_schema() {
        let provider = client(MockHttpClient::new());

        let request = ChatRequest::builder()
            .user("hi")
            .tools(vec![crate::domain::ToolSpec::new(
                "calculator",
                "math",
                serde_json::json!({"type": "object"}),
            )])
            .response_format(ResponseFormat::JsonSchema {
                name: "output_formatter".to_string(),
                schema: serde_json::json!({"type": "object"}),
            })
            .build();

        let body = provider.build_request(&request);
        assert_eq!(body["tools"][0]["function"]["name"], "calculator");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(
            body["response_format"]["json_schema"]["name"],
            "output_formatter"
        );
    }

    #[test]
    fn test_wire_message_roundtrip_roles() {
        let tool_msg = Message::tool("call_1", "calculator", "4");
        let wire = wire_message(&tool_msg);
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_1");

        let assistant = Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("call_1", "calculator", "{}")],
        );
        let wire = wire_message(&assistant);
        assert_eq!(wire["tool_calls"][0]["function"]["name"], "calculator");
    }
}
