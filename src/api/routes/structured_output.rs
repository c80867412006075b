//! Schema-bound single-shot chat

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::info;

use super::resolve_target;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatRequestBody, Json};
use crate::domain::{ChatRequest, DomainError, ResponseFormat};
use crate::infrastructure::llm::ClientFactory;

const TEMPLATE: &str = "Extract the requested fields from the input.\n\n\
The field \"entity\" refers to the first mentioned entity in the input.\n\n\
Input:\n\n{input}";

const TEMPERATURE: f32 = 0.7;
const FORMATTER_NAME: &str = "output_formatter";

static OUTPUT_SCHEMA: Lazy<serde_json::Value> = Lazy::new(|| {
    serde_json::json!({
        "type": "object",
        "description": "Should always be used to properly format output",
        "properties": {
            "tone": {
                "type": "string",
                "enum": ["positive", "negative", "neutral"],
                "description": "The overall tone of the input",
            },
            "entity": {
                "type": "string",
                "description": "The entity mentioned in the input",
            },
            "word_count": {
                "type": "number",
                "description": "The number of words in the input",
            },
            "chat_response": {
                "type": "string",
                "description": "A response to the human's input",
            },
            "final_punctuation": {
                "type": "string",
                "description": "The final punctuation mark in the input, if any.",
            },
        },
        "required": ["tone", "entity", "word_count", "chat_response"],
    })
});

/// Shape the model's answer must satisfy; deserializing enforces it
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct FormattedOutput {
    tone: Tone,
    entity: String,
    word_count: f64,
    chat_response: String,
    #[serde(default)]
    final_punctuation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Tone {
    Positive,
    Negative,
    Neutral,
}

/// POST /api/chat/structured_output
///
/// Binds the output schema to the client, invokes once (no streaming) and
/// returns the validated object directly, unwrapped.
pub async fn structured_output(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Response, ApiError> {
    let target = resolve_target(
        &state,
        body.provider.as_deref(),
        body.model.as_deref(),
        body.api_key.as_deref(),
    )?;

    let input = body
        .messages
        .last()
        .map(|m| m.content.clone())
        .ok_or_else(|| ApiError::bad_request("Messages cannot be empty"))?;

    info!(
        provider = target.provider.id,
        model = target.model.id,
        "processing structured output request"
    );

    let client = ClientFactory::create(target.provider.id, target.model.id, &target.api_key)?;

    let request = ChatRequest::builder()
        .user(TEMPLATE.replace("{input}", &input))
        .temperature(TEMPERATURE)
        .response_format(ResponseFormat::JsonSchema {
            name: FORMATTER_NAME.to_string(),
            schema: OUTPUT_SCHEMA.clone(),
        })
        .build();

    let response = client.chat(request).await?;
    let value = parse_and_validate(response.content())?;

    Ok(Json(value).into_response())
}

/// Parse the model's answer and check it against the declared schema,
/// returning the parsed object untouched when it conforms
fn parse_and_validate(content: &str) -> Result<serde_json::Value, DomainError> {
    let value: serde_json::Value = serde_json::from_str(content.trim())
        .map_err(|e| DomainError::schema_violation(format!("response is not valid JSON: {}", e)))?;

    serde_json::from_value::<FormattedOutput>(value.clone())
        .map_err(|e| DomainError::schema_violation(e.to_string()))?;

    Ok(value)
}
