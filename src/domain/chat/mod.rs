//! Chat primitives: messages, requests, responses and the client contract

mod client;
mod message;
mod request;
mod response;

pub use client::{ChatClient, ChatStream};
pub use message::{Message, MessageRole, ToolCall};
pub use request::{ChatRequest, ChatRequestBuilder, ResponseFormat, ToolSpec};
pub use response::{ChatResponse, FinishReason, StreamChunk, ToolCallDelta, Usage};

#[cfg(test)]
pub use client::mock::ScriptedChatClient;
