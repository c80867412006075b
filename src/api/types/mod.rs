//! API request/response types

pub mod chat;
pub mod error;
pub mod json;

pub use chat::{ChatRequestBody, IncomingMessage, TestProviderBody, TranscriptResponse};
pub use error::{ApiError, ErrorBody};
pub use json::Json;
