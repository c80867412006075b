//! Wire clients for the upstream model APIs
//!
//! One client per protocol family; vendors sharing the OpenAI-compatible
//! surface reuse `OpenAiCompatClient` with their own base URL.

mod anthropic;
mod factory;
mod google;
mod openai;

pub use anthropic::AnthropicClient;
pub use factory::ClientFactory;
pub use google::GoogleClient;
pub use openai::OpenAiCompatClient;

use std::collections::VecDeque;

use futures::{Stream, StreamExt};

use crate::infrastructure::http::{ByteStream, HttpError};

struct SseState {
    inner: ByteStream,
    buffer: String,
    pending: VecDeque<String>,
    done: bool,
}

/// Split a raw byte stream into SSE `data:` payloads
///
/// Events may be fragmented or coalesced arbitrarily by the transport, so
/// incomplete lines are buffered until their terminator arrives.
pub(crate) fn sse_data_lines(
    byte_stream: ByteStream,
) -> impl Stream<Item = Result<String, HttpError>> + Send {
    let state = SseState {
        inner: byte_stream,
        buffer: String::new(),
        pending: VecDeque::new(),
        done: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.pending.pop_front() {
                return Some((Ok(line), state));
            }

            if state.done {
                return None;
            }

            match state.inner.next().await {
                Some(Ok(bytes)) => {
                    state.buffer.push_str(&String::from_utf8_lossy(&bytes));

                    while let Some(pos) = state.buffer.find('\n') {
                        let line: String = state.buffer.drain(..=pos).collect();
                        if let Some(data) = line.trim_end().strip_prefix("data: ") {
                            state.pending.push_back(data.to_string());
                        }
                    }
                }
                Some(Err(e)) => return Some((Err(e), state)),
                None => {
                    state.done = true;

                    let rest = std::mem::take(&mut state.buffer);
                    if let Some(data) = rest.trim_end().strip_prefix("data: ") {
                        state.pending.push_back(data.to_string());
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures::{stream, StreamExt};

    use super::*;

    fn byte_stream(chunks: Vec<&str>) -> ByteStream {
        let chunks: Vec<Result<Bytes, HttpError>> = chunks
            .into_iter()
            .map(|c| Ok(Bytes::from(c.to_string())))
            .collect();
        Box::pin(stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_sse_lines_simple() {
        let lines: Vec<String> = sse_data_lines(byte_stream(vec!["data: one\n\ndata: two\n\n"]))
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(lines, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_sse_lines_fragmented_across_chunks() {
        let lines: Vec<String> =
            sse_data_lines(byte_stream(vec!["data: hel", "lo\ndata: wor", "ld\n"]))
                .map(|r| r.unwrap())
                .collect()
                .await;

        assert_eq!(lines, vec!["hello", "world"]);
    }

    #[tokio::test]
    async fn test_sse_lines_ignores_non_data_lines() {
        let lines: Vec<String> = sse_data_lines(byte_stream(vec![
            "event: message_start\ndata: payload\r\n: keepalive\n",
        ]))
        .map(|r| r.unwrap())
        .collect()
        .await;

        assert_eq!(lines, vec!["payload"]);
    }
}
