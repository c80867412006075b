use std::fmt::Debug;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::response::StreamChunk;
use super::{ChatRequest, ChatResponse};
use crate::domain::DomainError;

/// Stream type for chat responses
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, DomainError>> + Send>>;

/// A live handle bound to one provider, model and credential
///
/// Created fresh per request and never cached: each request may carry a
/// different credential.
#[async_trait]
pub trait ChatClient: Send + Sync + Debug {
    /// Send a chat request and wait for the complete response
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, DomainError>;

    /// Send a chat request and consume the response incrementally
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, DomainError>;

    /// Registry id of the provider this client talks to
    fn provider_id(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use futures::stream;

    use super::*;

    /// Chat client that replays scripted turns, one per invocation
    #[derive(Debug, Default)]
    pub struct ScriptedChatClient {
        responses: Mutex<VecDeque<Result<ChatResponse, DomainError>>>,
        stream_turns: Mutex<VecDeque<Vec<Result<StreamChunk, DomainError>>>>,
    }

    impl ScriptedChatClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, response: ChatResponse) -> Self {
            self.responses.lock().unwrap().push_back(Ok(response));
            self
        }

        pub fn with_error(self, error: DomainError) -> Self {
            self.responses.lock().unwrap().push_back(Err(error));
            self
        }

        pub fn with_stream_turn(self, chunks: Vec<Result<StreamChunk, DomainError>>) -> Self {
            self.stream_turns.lock().unwrap().push_back(chunks);
            self
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChatClient {
        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, DomainError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(DomainError::internal("no scripted response left")))
        }

        async fn chat_stream(&self, _request: ChatRequest) -> Result<ChatStream, DomainError> {
            let chunks = self
                .stream_turns
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| DomainError::internal("no scripted stream turn left"))?;

            Ok(Box::pin(stream::iter(chunks)))
        }

        fn provider_id(&self) -> &'static str {
            "scripted"
        }
    }
}
