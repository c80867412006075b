//! Tool-augmented chat

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tracing::info;

use super::{resolve_target, text_stream_response};
use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatRequestBody, Json, TranscriptResponse};
use crate::domain::Message;
use crate::infrastructure::agent::{assemble_toolset, AgentExecutor};
use crate::infrastructure::llm::ClientFactory;

const DEFAULT_AGENT_SYSTEM_PROMPT: &str = "You are a talking parrot named Polly. All final responses must be how a talking parrot would respond. Squawk often!\n\n\
Tool policy to ensure a final answer:\n\
- For factual, current, or location-based questions (e.g., weather/time), first try exa_answer with the original question.\n\
- If exa_answer refuses, returns no value, or is uncertain, then call exa_search_with_content to fetch content and synthesize the answer. Use exa_search to collect and cross-check citations when helpful.\n\
- After tool calls, ALWAYS provide a short, concrete answer to the user's question (not just commentary about results).";

/// POST /api/chat/agents
///
/// Runs the tool-calling loop. Without `show_intermediate_steps` the
/// response streams content chunks only; with it, the whole transcript
/// (tool calls and results included) returns as one JSON value.
pub async fn chat_agents(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Response, ApiError> {
    let target = resolve_target(
        &state,
        body.provider.as_deref(),
        body.model.as_deref(),
        body.api_key.as_deref(),
    )?;

    // Intermediate steps are rendered as system messages client-side;
    // only the real conversation goes back to the model
    let history: Vec<Message> = body
        .messages
        .iter()
        .filter(|m| m.role == "user" || m.role == "assistant")
        .map(|m| {
            if m.role == "user" {
                Message::user(&m.content)
            } else {
                Message::assistant(&m.content)
            }
        })
        .collect();

    if history.is_empty() {
        return Err(ApiError::bad_request("Messages cannot be empty"));
    }

    info!(
        provider = target.provider.id,
        model = target.model.id,
        intermediate_steps = body.show_intermediate_steps,
        "processing agent request"
    );

    let client = ClientFactory::create(target.provider.id, target.model.id, &target.api_key)?;
    let tools = assemble_toolset(&state.tool_settings, body.exa_api_key.as_deref(), &state.http);

    let system_prompt = body
        .system_prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_AGENT_SYSTEM_PROMPT);

    let executor = AgentExecutor::new(client, tools, system_prompt);

    if body.show_intermediate_steps {
        let messages = executor.run(history).await?;
        Ok(Json(TranscriptResponse { messages }).into_response())
    } else {
        Ok(text_stream_response(executor.stream(history)))
    }
}
