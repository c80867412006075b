use std::collections::BTreeMap;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{
    ChatClient, ChatRequest, ChatStream, DomainError, Message, StreamChunk, Tool, ToolCall,
    ToolCallDelta, ToolSpec,
};

/// Upper bound on model turns before the loop gives up on a final answer
const MAX_TURNS: usize = 8;

const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Tool-calling loop around one chat client
///
/// Each turn the model sees the system prompt, the conversation so far and
/// the toolset. Turns that request tools are executed and their observations
/// appended; the loop ends at the first turn without tool calls.
pub struct AgentExecutor {
    client: Arc<dyn ChatClient>,
    tools: Vec<Arc<dyn Tool>>,
    system_prompt: String,
}

impl AgentExecutor {
    pub fn new(
        client: Arc<dyn ChatClient>,
        tools: Vec<Arc<dyn Tool>>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tools,
            system_prompt: system_prompt.into(),
        }
    }

    fn tool_specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|tool| {
                ToolSpec::new(
                    tool.name(),
                    tool.description(),
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "input": {
                                "type": "string",
                                "description": "Free-text input for the tool",
                            }
                        },
                        "required": ["input"],
                    }),
                )
            })
            .collect()
    }

    fn build_request(&self, transcript: &[Message]) -> ChatRequest {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(Message::system(&self.system_prompt));
        messages.extend(transcript.iter().cloned());

        ChatRequest::builder()
            .messages(messages)
            .temperature(DEFAULT_TEMPERATURE)
            .tools(self.tool_specs())
            .build()
    }

    /// Run to completion and return the full transcript, tool traffic included
    pub async fn run(&self, history: Vec<Message>) -> Result<Vec<Message>, DomainError> {
        let mut transcript = history;

        for _ in 0..MAX_TURNS {
            let response = self.client.chat(self.build_request(&transcript)).await?;

            let tool_calls = response.message.tool_calls.clone();
            transcript.push(response.message);

            if tool_calls.is_empty() {
                return Ok(transcript);
            }

            for call in tool_calls {
                let observation = self.execute_tool(&call).await;
                transcript.push(Message::tool(call.id, call.name, observation));
            }
        }

        warn!("agent reached the turn limit before a final answer");
        Ok(transcript)
    }

    /// Stream user-visible content as it is generated
    ///
    /// Chunks that carry only a tool-call decision are not forwarded; the
    /// tool calls they describe are executed between turns.
    pub fn stream(self, history: Vec<Message>) -> ChatStream {
        let (tx, rx) = mpsc::channel::<Result<StreamChunk, DomainError>>(32);

        tokio::spawn(async move {
            if let Err(e) = self.drive_stream(history, &tx).await {
                let _ = tx.send(Err(e)).await;
            }
        });

        Box::pin(ReceiverStream::new(rx))
    }

    async fn drive_stream(
        &self,
        mut transcript: Vec<Message>,
        tx: &mpsc::Sender<Result<StreamChunk, DomainError>>,
    ) -> Result<(), DomainError> {
        for _ in 0..MAX_TURNS {
            let mut stream = self
                .client
                .chat_stream(self.build_request(&transcript))
                .await?;

            let mut content = String::new();
            let mut pending: BTreeMap<usize, PendingToolCall> = BTreeMap::new();

            while let Some(chunk_result) = stream.next().await {
                let chunk = chunk_result?;

                if chunk.has_content() {
                    let delta = chunk.delta.clone().unwrap_or_default();
                    content.push_str(&delta);

                    if tx
                        .send(Ok(StreamChunk::default().with_delta(delta)))
                        .await
                        .is_err()
                    {
                        // Receiver is gone; stop forwarding and do no more work
                        debug!("stream receiver dropped, aborting agent run");
                        return Ok(());
                    }
                }

                for delta in chunk.tool_calls {
                    pending.entry(delta.index).or_default().merge(delta);
                }
            }

            if pending.is_empty() {
                return Ok(());
            }

            let calls: Vec<ToolCall> = pending
                .into_values()
                .filter_map(PendingToolCall::into_tool_call)
                .collect();

            transcript.push(Message::assistant_with_tool_calls(content, calls.clone()));

            for call in calls {
                let observation = self.execute_tool(&call).await;
                transcript.push(Message::tool(call.id, call.name, observation));
            }
        }

        warn!("agent reached the turn limit before a final answer");
        Ok(())
    }

    async fn execute_tool(&self, call: &ToolCall) -> String {
        debug!(tool = %call.name, "executing tool call");

        match self.tools.iter().find(|t| t.name() == call.name) {
            Some(tool) => tool.invoke(&extract_input(&call.arguments)).await,
            None => format!("Tool {} is not available.", call.name),
        }
    }
}

/// Accumulates the fragments of one streamed tool call
#[derive(Debug, Default)]
struct PendingToolCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

impl PendingToolCall {
    fn merge(&mut self, delta: ToolCallDelta) {
        if delta.id.is_some() {
            self.id = delta.id;
        }
        if delta.name.is_some() {
            self.name = delta.name;
        }
        self.arguments.push_str(&delta.arguments);
    }

    fn into_tool_call(self) -> Option<ToolCall> {
        let name = self.name?;
        // Some wires (Gemini) carry no call ids; invent one for correlation
        let id = self
            .id
            .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple()));
        let arguments = if self.arguments.is_empty() {
            "{}".to_string()
        } else {
            self.arguments
        };

        Some(ToolCall::new(id, name, arguments))
    }
}

/// Pull the free-text input out of a single-input tool's argument JSON
fn extract_input(arguments: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(arguments) {
        Ok(serde_json::Value::Object(map)) => match map.get("input") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        Ok(serde_json::Value::String(s)) => s,
        _ => arguments.to_string(),
    }
}
