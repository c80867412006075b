//! Plain streaming chat

use axum::extract::State;
use axum::response::Response;
use tracing::info;

use super::{resolve_target, text_stream_response};
use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatRequestBody, IncomingMessage, Json};
use crate::domain::ChatRequest;
use crate::infrastructure::llm::ClientFactory;

const TEMPLATE: &str = "You are a helpful AI assistant. Provide clear, accurate, and helpful responses.\n\n\
Current conversation:\n{chat_history}\n\nUser: {input}\nAI:";

const TEMPERATURE: f32 = 0.7;

/// POST /api/chat
///
/// Renders the conversation into a prompt template and streams the model's
/// text back as plain chunks in generation order.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Response, ApiError> {
    let target = resolve_target(
        &state,
        body.provider.as_deref(),
        body.model.as_deref(),
        body.api_key.as_deref(),
    )?;

    if body.messages.is_empty() {
        return Err(ApiError::bad_request("Messages cannot be empty"));
    }

    info!(
        provider = target.provider.id,
        model = target.model.id,
        "processing chat request"
    );

    let (history, input) = split_conversation(&body.messages);
    let prompt = TEMPLATE
        .replace("{chat_history}", &history)
        .replace("{input}", &input);

    let client = ClientFactory::create(target.provider.id, target.model.id, &target.api_key)?;

    let request = ChatRequest::builder()
        .user(prompt)
        .temperature(TEMPERATURE)
        .build();

    let stream = client.chat_stream(request).await?;
    Ok(text_stream_response(stream))
}

/// The final message is the current input; everything before it is rendered
/// as "role: content" history lines
fn split_conversation(messages: &[IncomingMessage]) -> (String, String) {
    let Some((current, previous)) = messages.split_last() else {
        return (String::new(), String::new());
    };

    let history: Vec<String> = previous
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect();

    (history.join("\n"), current.content.clone())
}
