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

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Client for the Anthropic messages API
///
/// Structured output is expressed as a forced tool call: the schema becomes
/// a tool's input schema and the tool's input comes back as the answer.
#[derive(Debug)]
pub struct AnthropicClient<C: HttpClientTrait> {
    client: C,
    provider: &'static Provider,
    model: String,
    api_key: String,
}

impl<C: HttpClientTrait> AnthropicClient<C> {
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

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.provider.base_url.trim_end_matches('/'))
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, request: &ChatRequest) -> serde_json::Value {
        let (system, messages) = split_system_messages(&request.messages);

        let wire_messages: Vec<serde_json::Value> =
            messages.into_iter().map(wire_message).collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": wire_messages,
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "stream": request.stream,
        });

        if let Some(system_content) = system {
            body["system"] = serde_json::json!(system_content);
        }

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        let mut tools: Vec<serde_json::Value> = request
            .tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "input_schema": t.parameters,
                })
            })
            .collect();

        if let Some(ResponseFormat::JsonSchema { name, schema }) = &request.response_format {
            tools.push(serde_json::json!({
                "name": name,
                "description": "Record the answer in the requested format.",
                "input_schema": schema,
            }));
            body["tool_choice"] = serde_json::json!({"type": "tool", "name": name});
        }

        if !tools.is_empty() {
            body["tools"] = serde_json::json!(tools);
        }

        body
    }

    fn parse_response(
        &self,
        json: serde_json::Value,
        structured_name: Option<&str>,
    ) -> Result<ChatResponse, DomainError> {
        let response: WireResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::upstream_unavailable(
                self.provider.id,
                format!("failed to parse response: {}", e),
            )
        })?;

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();
        let mut structured: Option<serde_json::Value> = None;

        for block in response.content {
            match block.block_type.as_str() {
                "text" => {
                    if let Some(text) = block.text {
                        text_parts.push(text);
                    }
                }
                "tool_use" => {
                    let name = block.name.unwrap_or_default();
                    let input = block.input.unwrap_or(serde_json::Value::Null);

                    if structured_name == Some(name.as_str()) {
                        structured = Some(input);
                    } else {
                        tool_calls.push(ToolCall::new(
                            block.id.unwrap_or_default(),
                            name,
                            input.to_string(),
                        ));
                    }
                }
                _ => {}
            }
        }

        // A forced formatter tool carries the whole answer in its input
        let content = match structured {
            Some(value) => value.to_string(),
            None => text_parts.join(""),
        };

        let message = if tool_calls.is_empty() {
            Message::assistant(content)
        } else {
            Message::assistant_with_tool_calls(content, tool_calls)
        };

        let mut chat_response = ChatResponse::new(response.id, message);
        chat_response =
            chat_response.with_finish_reason(parse_stop_reason(response.stop_reason.as_deref()));

        if let Some(usage) = response.usage {
            chat_response =
                chat_response.with_usage(Usage::new(usage.input_tokens, usage.output_tokens));
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> ChatClient for AnthropicClient<C> {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, DomainError> {
        let mut req = request;
        req.stream = false;

        let structured_name = match &req.response_format {
            Some(ResponseFormat::JsonSchema { name, .. }) => Some(name.clone()),
            None => None,
        };

        let url = self.messages_url();
        let body = self.build_request(&req);
        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| upstream_error(self.provider.id, e))?;

        self.parse_response(response, structured_name.as_deref())
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, DomainError> {
        let mut req = request;
        req.stream = true;

        let url = self.messages_url();
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

fn split_system_messages(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
    let mut system_content = String::new();
    let mut other_messages = Vec::new();

    for msg in messages {
        if msg.role == MessageRole::System {
            if !system_content.is_empty() {
                system_content.push('\n');
            }
            system_content.push_str(&msg.content);
        } else {
            other_messages.push(msg);
        }
    }

    let system = if system_content.is_empty() {
        None
    } else {
        Some(system_content)
    };

    (system, other_messages)
}

fn wire_message(message: &Message) -> serde_json::Value {
    match message.role {
        MessageRole::Tool => {
            // Tool results travel as user-side tool_result blocks
            serde_json::json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": message.tool_call_id,
                    "content": message.content,
                }]
            })
        }
        MessageRole::Assistant if message.has_tool_calls() => {
            let mut blocks = Vec::new();

            if !message.content.is_empty() {
                blocks.push(serde_json::json!({"type": "text", "text": message.content}));
            }

            for tc in &message.tool_calls {
                let input: serde_json::Value =
                    serde_json::from_str(&tc.arguments).unwrap_or(serde_json::json!({}));
                blocks.push(serde_json::json!({
                    "type": "tool_use",
                    "id": tc.id,
                    "name": tc.name,
                    "input": input,
                }));
            }

            serde_json::json!({"role": "assistant", "content": blocks})
        }
        MessageRole::Assistant => serde_json::json!({
            "role": "assistant",
            "content": message.content,
        }),
        // System messages are split off before this point
        MessageRole::System | MessageRole::User => serde_json::json!({
            "role": "user",
            "content": message.content,
        }),
    }
}

fn parse_stream_data(data: &str) -> Option<Result<StreamChunk, DomainError>> {
    let event: WireStreamEvent = serde_json::from_str(data).ok()?;
    let index = event.index.unwrap_or(0);

    match event.event_type.as_str() {
        "content_block_start" => {
            let block = event.content_block?;
            if block.block_type == "tool_use" {
                return Some(Ok(StreamChunk::default().with_tool_call(ToolCallDelta {
                    index,
                    id: block.id,
                    name: block.name,
                    arguments: String::new(),
                })));
            }
            None
        }
        "content_block_delta" => {
            let delta = event.delta?;
            match delta.delta_type.as_str() {
                "text_delta" => delta
                    .text
                    .map(|text| Ok(StreamChunk::default().with_delta(text))),
                "input_json_delta" => delta.partial_json.map(|fragment| {
                    Ok(StreamChunk::default().with_tool_call(ToolCallDelta {
                        index,
                        id: None,
                        name: None,
                        arguments: fragment,
                    }))
                }),
                _ => None,
            }
        }
        "message_delta" => {
            let delta = event.delta?;
            delta.stop_reason.map(|reason| {
                Ok(StreamChunk::default()
                    .with_finish_reason(parse_stop_reason(Some(reason.as_str()))))
            })
        }
        "message_stop" => Some(Ok(
            StreamChunk::default().with_finish_reason(FinishReason::Stop)
        )),
        _ => None,
    }
}

fn parse_stop_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("end_turn") | Some("stop_sequence") => FinishReason::Stop,
        Some("max_tokens") => FinishReason::Length,
        Some("tool_use") => FinishReason::ToolCalls,
        _ => FinishReason::Stop,
    }
}

// Wire types

#[derive(Debug, Deserialize)]
struct WireResponse {
    id: String,
    content: Vec<WireContentBlock>,
    stop_reason: Option<String>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
    id: Option<String>,
    name: Option<String>,
    input: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireStreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    index: Option<usize>,
    content_block: Option<WireStreamBlock>,
    delta: Option<WireStreamDelta>,
}

#[derive(Debug, Deserialize)]
struct WireStreamBlock {
    #[serde(rename = "type")]
    block_type: String,
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireStreamDelta {
    #[serde(rename = "type", default)]
    delta_type: String,
    text: Option<String>,
    partial_json: Option<String>,
    stop_reason: Option<String>,
}
