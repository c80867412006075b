//! Domain layer: errors, chat primitives, provider catalog and tool contract

pub mod chat;
pub mod error;
pub mod registry;
pub mod tool;

pub use chat::{
    ChatClient, ChatRequest, ChatResponse, ChatStream, FinishReason, Message, MessageRole,
    ResponseFormat, StreamChunk, ToolCall, ToolCallDelta, ToolSpec, Usage,
};
pub use error::DomainError;
pub use tool::Tool;
